//! Cereal page: document structure, h1/hr/p, two lists and an image.

use super::{EvalContext, EvaluationError, Rubric, RubricResult, Scorecard};
use crate::html::Document;

/// Rubric for "my first webpage", out of 40.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstWebpage;

impl Rubric for FirstWebpage {
    fn name(&self) -> &'static str {
        "my first webpage"
    }

    fn max_score(&self) -> u32 {
        40
    }

    fn fetch_failure_score(&self) -> u32 {
        1
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &EvalContext<'_>,
    ) -> Result<RubricResult, EvaluationError> {
        let mut card = Scorecard::full(self.max_score());

        let structure = doc.has_doctype()
            && doc.declares("html")
            && doc.declares("head")
            && doc.declares("body");
        if card.check(
            structure,
            2,
            "Missing one or more basic structure elements: <!DOCTYPE>, <html>, <head>, <body>.",
        ) {
            card.check(doc.has_indentation(), 1, "No indentation found in the file.");
        }

        card.check(
            doc.find_first("h1").is_some()
                && doc.find_first("hr").is_some()
                && doc.find_first("p").is_some(),
            3,
            "Missing a heading for the favorite cereal, a horizontal rule, or a paragraph \
             describing it.",
        );

        card.check(
            list_has_items(doc, "ul", 3),
            4,
            "Missing an unordered list describing features of the favorite cereal or fewer than \
             3 items.",
        );

        card.check(
            list_has_items(doc, "ol", 3),
            4,
            "Missing an ordered list ranking favorite cereals or fewer than 3 items.",
        );

        let images = doc.find_all(&["img"]);
        let has_alt = images.iter().any(|img| img.has_value("alt"));
        let heading_before = images.iter().any(|img| doc.heading_precedes(img));
        card.check(
            has_alt && heading_before,
            4,
            "Missing a relevant heading for the cereal image or the image does not include an \
             alt attribute.",
        );

        Ok(card.finish())
    }
}

/// Whether the first `tag` list holds at least `min` items.
fn list_has_items(doc: &Document, tag: &str, min: usize) -> bool {
    doc.find_first(tag)
        .is_some_and(|list| list.find_all(&["li"]).len() >= min)
}
