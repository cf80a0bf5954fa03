//! Second page: structure, content tags, images and inline styles.

use itertools::Itertools;

use super::{EvalContext, EvaluationError, Rubric, RubricResult, Scorecard};
use crate::html::{Document, Node};

/// Points lost per missing content or style item.
const PER_ITEM: u32 = 2;
/// Cap on the content and style deductions.
const GROUP_CAP: u32 = 6;

/// Rubric for "my second webpage", out of 40.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecondWebpage;

impl Rubric for SecondWebpage {
    fn name(&self) -> &'static str {
        "my second webpage"
    }

    fn max_score(&self) -> u32 {
        40
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &EvalContext<'_>,
    ) -> Result<RubricResult, EvaluationError> {
        let mut card = Scorecard::full(self.max_score());

        // structure
        let mut missing = Vec::new();
        if !doc.has_doctype() {
            missing.push("<!DOCTYPE>");
        }
        for (tag, label) in [("html", "<html>"), ("head", "<head>"), ("body", "<body>")] {
            if !doc.declares(tag) {
                missing.push(label);
            }
        }
        if !missing.is_empty() {
            card.deduct(
                4,
                format!("Missing structure elements: {}.", missing.iter().join(", ")),
            );
        }

        // content
        let mut issues = Vec::new();
        if doc.find_first("h1").is_none() {
            issues.push("Missing largest heading (<h1>).");
        }
        if doc.find_first("hr").is_none() {
            issues.push("Missing horizontal rule (<hr>).");
        }
        if doc.find_first("p").is_none() {
            issues.push("Missing paragraph (<p>).");
        }
        if doc.find_all(&["h2", "h3"]).len() < 2 {
            issues.push("Fewer than 2 smaller headings (<h2> or <h3>).");
        }
        if doc.find_first("ul").is_none() {
            issues.push("Missing unordered list (<ul>).");
        }
        if doc.find_first("ol").is_none() {
            issues.push("Missing ordered list (<ol>).");
        }
        deduct_group(&mut card, "HTML content issues", &issues);

        // images
        let images = doc.find_all(&["img"]);
        let with_alt = images.iter().filter(|img| img.has_value("alt")).count();
        card.check(
            with_alt >= 3,
            4,
            format!(
                "Missing alt attributes or fewer than 3 images have alt attributes. Found: \
                 {with_alt}."
            ),
        );
        card.check(
            images.iter().any(|img| src_contains(img, "border")),
            2,
            "Missing border image.",
        );
        card.check(
            images
                .iter()
                .any(|img| src_contains(img, "youtube") && is_80px_wide(img)),
            2,
            "Missing YouTube logo with correct size (80px width).",
        );

        // inline styles
        let mut style_issues = Vec::new();
        let body_style = doc.find_first("body").map(|b| b.style()).unwrap_or_default();
        if !body_style.contains("background-color") {
            style_issues.push("Missing background color style on <body>.");
        }
        let styled_headings = doc
            .find_all(&["h1", "h2", "h3"])
            .iter()
            .filter(|h| !h.style().trim().is_empty())
            .count();
        if styled_headings < 3 {
            style_issues.push("Fewer than 3 headings (<h1>, <h2>, <h3>) have inline styles.");
        }
        let styled_list = ["ul", "ol"]
            .iter()
            .filter_map(|tag| doc.find_first(tag))
            .any(|list| !list.style().trim().is_empty());
        if !styled_list {
            style_issues.push("Lists (<ul> or <ol>) are missing styles.");
        }
        let bordered = doc
            .elements()
            .iter()
            .filter(|el| el.style().contains("border"))
            .count();
        if bordered < 2 {
            style_issues.push("Fewer than 2 elements use border property.");
        }
        deduct_group(&mut card, "Inline style issues", &style_issues);

        Ok(card.finish())
    }
}

/// Deducts two points per issue, capped, with a single feedback line.
fn deduct_group(card: &mut Scorecard, label: &str, issues: &[&str]) {
    if issues.is_empty() {
        return;
    }
    let points = (PER_ITEM * issues.len() as u32).min(GROUP_CAP);
    card.deduct(points, format!("{label}: {}.", issues.iter().join(", ")));
}

/// Case-insensitive substring test on the image source.
fn src_contains(img: &Node<'_>, needle: &str) -> bool {
    img.attr("src")
        .is_some_and(|src| src.to_lowercase().contains(needle))
}

/// Width given as the `width` attribute or as an inline style.
fn is_80px_wide(img: &Node<'_>) -> bool {
    let attr = img
        .attr("width")
        .map(|w| w.trim().to_ascii_lowercase())
        .is_some_and(|w| w == "80px" || w == "80");
    let style = img.style().replace(' ', "");
    attr || style.contains("width:80px")
}
