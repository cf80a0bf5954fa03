//! Practical HTML test, scored task by task.
//!
//! Each task has its own budget and is floored at zero on its own, so a bad
//! task cannot eat into the points of another. The task budgets add up to
//! more than the assignment is worth; the total is capped at the maximum.

use std::sync::LazyLock;

use regex::Regex;

use super::{EvalContext, EvaluationError, Rubric, RubricResult, Scorecard};
use crate::html::{Document, Node};

/// A named character reference such as `&copy;` or `&#169;`.
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[#0-9a-zA-Z]+;").expect("entity pattern compiles"));

/// Rubric for "html test", out of 44.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTest;

/// Budget for one task, collecting its own deductions.
struct Task {
    /// Points left in this task.
    points:   i64,
    /// Feedback raised by this task.
    feedback: Vec<String>,
}

impl Task {
    /// A task worth `points`.
    fn new(points: u32) -> Self {
        Self {
            points:   i64::from(points),
            feedback: Vec::new(),
        }
    }

    /// Deducts `points` unless `passed`.
    fn check(&mut self, passed: bool, points: u32, feedback: &str) -> bool {
        if !passed {
            self.points -= i64::from(points);
            self.feedback.push(feedback.to_string());
        }
        passed
    }

    /// Loses the whole task.
    fn zero(&mut self, feedback: &str) {
        self.points = 0;
        self.feedback.push(feedback.to_string());
    }

    /// Adds what is left of this task to `card`.
    fn close(self, card: &mut Scorecard) {
        card.award(u32::try_from(self.points.max(0)).unwrap_or_default());
        for line in self.feedback {
            card.note(line);
        }
    }
}

impl Rubric for HtmlTest {
    fn name(&self) -> &'static str {
        "html test"
    }

    fn max_score(&self) -> u32 {
        44
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &EvalContext<'_>,
    ) -> Result<RubricResult, EvaluationError> {
        let mut card = Scorecard::empty(self.max_score());
        let sheet = doc.style_sheet();
        let styled = |node: &Node<'_>| is_styled(node, &sheet);

        // page setup
        let mut task = Task::new(4);
        task.check(doc.has_html5_doctype(), 2, "Missing correct HTML5 doctype.");
        task.check(
            doc.find_first("title").is_some(),
            2,
            "Missing title tag or it is incorrect.",
        );
        task.close(&mut card);

        // header and hyperlinks
        let mut task = Task::new(6);
        task.check(
            !doc.find_all(&["h1", "h2", "h3"]).is_empty(),
            3,
            "Missing proper header formatting (h1, h2, or h3).",
        );
        let new_tab_links = doc
            .find_all(&["a"])
            .iter()
            .filter(|a| a.attr("href").is_some() && a.opens_in_new_tab())
            .count();
        task.check(
            new_tab_links >= 2,
            3,
            "Missing required hyperlinks that open in a new tab.",
        );
        task.close(&mut card);

        // table
        let mut task = Task::new(10);
        match doc.find_first("table") {
            None => task.zero("Missing table."),
            Some(table) => {
                task.check(
                    table.find_all(&["tr"]).len() >= 4,
                    3,
                    "Table must have at least 4 rows.",
                );
                task.check(
                    table.find_all(&["td"]).len() >= 12,
                    3,
                    "Table must have at least 12 cells.",
                );
                task.check(
                    styled(&table),
                    4,
                    "Table lacks necessary styling (inline or internal styles missing).",
                );
            }
        }
        task.close(&mut card);

        // image
        let mut task = Task::new(6);
        match doc.find_first("img") {
            None => task.zero("Missing image."),
            Some(img) => {
                if task.check(img.has_value("src"), 3, "Image source is missing.") {
                    task.check(
                        styled(&img),
                        3,
                        "Image lacks required styling (inline or internal styles missing).",
                    );
                }
            }
        }
        task.close(&mut card);

        // lists and rule
        let mut task = Task::new(10);
        task.check(
            doc.find_all(&["ul", "ol"]).len() >= 2,
            5,
            "Missing required lists (one numbered and one bulleted list).",
        );
        task.check(
            doc.find_first("hr").is_some(),
            5,
            "Missing horizontal rule for content separation.",
        );
        task.close(&mut card);

        // concluding paragraph
        let mut task = Task::new(5);
        if !doc.find_all(&["p"]).iter().any(|p| p.word_count() >= 5) {
            task.zero(
                "Concluding paragraph is missing or too short (must be at least 5 sentences).",
            );
        }
        task.close(&mut card);

        // final touches
        let mut task = Task::new(5);
        task.check(
            has_entity(doc.raw()),
            3,
            "Missing use of a special character entity (e.g., &copy;, &amp;).",
        );
        let inline = doc
            .elements()
            .iter()
            .filter(|el| el.attr("style").is_some())
            .count();
        let internal = usize::from(doc.find_first("style").is_some());
        task.check(
            inline + internal >= 3,
            2,
            "Missing at least 3 additional styles (inline or internal) to enhance the appearance.",
        );
        task.close(&mut card);

        // organization
        let mut task = Task::new(4);
        task.check(
            ["body", "head", "html"].iter().all(|tag| doc.declares(tag)),
            4,
            "Code lacks proper organization and readability.",
        );
        task.close(&mut card);

        Ok(card.finish())
    }
}

/// Inline style, or a class that the internal style sheet mentions.
fn is_styled(node: &Node<'_>, sheet: &str) -> bool {
    node.has_value("style") || node.classes().iter().any(|class| sheet.contains(class))
}

/// Whether `raw` uses a character entity.
fn has_entity(raw: &str) -> bool {
    ENTITY.is_match(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_are_detected() {
        assert!(has_entity("&copy; 2024"));
        assert!(has_entity("&#169;"));
        assert!(!has_entity("fish & chips"));
    }

    #[test]
    fn class_counts_as_style_only_when_the_sheet_names_it() {
        let doc = Document::parse(
            "<style>.fancy { border: 1px solid; }</style><table class=\"fancy\"></table><img \
             class=\"plain\">",
        );
        let sheet = doc.style_sheet();
        assert!(is_styled(&doc.find_first("table").unwrap(), &sheet));
        assert!(!is_styled(&doc.find_first("img").unwrap(), &sheet));
    }
}
