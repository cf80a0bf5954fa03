//! Uploaded page with headings, a rule and a paragraph.

use std::collections::BTreeSet;

use itertools::Itertools;

use super::{EvalContext, EvaluationError, Rubric, RubricResult, Scorecard};
use crate::{classify::SubmissionSource, html::Document};

/// Rubric for "heading hr", out of 20. Grades the uploaded file itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingHr;

impl Rubric for HeadingHr {
    fn name(&self) -> &'static str {
        "heading hr"
    }

    fn max_score(&self) -> u32 {
        20
    }

    fn source(&self) -> SubmissionSource {
        SubmissionSource::Uploaded
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &EvalContext<'_>,
    ) -> Result<RubricResult, EvaluationError> {
        let mut card = Scorecard::full(self.max_score());

        let levels: BTreeSet<&str> = doc
            .elements()
            .into_iter()
            .filter(|n| n.is_heading())
            .map(|n| n.name())
            .collect();
        card.check(levels.len() >= 3, 5, "Fewer than 3 different heading tags found.");
        card.check(doc.find_first("hr").is_some(), 5, "Missing horizontal rule.");
        card.check(doc.find_first("p").is_some(), 5, "Missing paragraph tag.");

        let mut missing = Vec::new();
        if !doc.has_doctype() {
            missing.push("<!DOCTYPE>");
        }
        for (tag, label) in [("html", "<html>"), ("head", "<head>"), ("body", "<body>")] {
            if !doc.declares(tag) {
                missing.push(label);
            }
        }
        if missing.is_empty() {
            card.check(doc.has_indentation(), 5, "No indentation found in the file.");
        } else {
            card.deduct(
                5,
                format!("Missing basic structure elements: {}.", missing.iter().join(", ")),
            );
        }

        Ok(card.finish())
    }
}
