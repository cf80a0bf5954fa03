#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Per-assignment rubrics.
//!
//! Every rubric is a fixed table of independent checks. A failed check costs
//! a fixed number of points and adds exactly one feedback line, in check
//! order. The final score is clamped to `[0, max]`.

/// "dungeon": two tables, a map and its legend.
pub mod dungeon;
/// "my first webpage": structure, lists and an image.
pub mod first_webpage;
/// "my first website": linked pages and an external link.
pub mod first_website;
/// "heading hr": the uploaded page itself is graded.
pub mod heading_hr;
/// "html test": weighted tasks of the practical test.
pub mod html_test;
/// "my second webpage": content, images and inline styles.
pub mod second_webpage;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use url::Url;

pub use dungeon::DungeonMap;
pub use first_webpage::FirstWebpage;
pub use first_website::{FirstWebsite, FirstWebsiteOnePage};
pub use heading_hr::HeadingHr;
pub use html_test::HtmlTest;
pub use second_webpage::SecondWebpage;

use crate::{
    classify::SubmissionSource,
    constants::{FEEDBACK_SEPARATOR, NO_ISSUES_FEEDBACK},
    fetch::{Fetch, FetchError},
    html::Document,
};

/// Score and ordered feedback produced by a rubric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricResult {
    /// Points earned, within `[0, max]`.
    pub score:    u32,
    /// One line per failed check, in check order.
    pub feedback: Vec<String>,
}

impl RubricResult {
    /// Feedback lines joined for the gradebook, or the no-issues message.
    pub fn joined_feedback(&self) -> String {
        if self.feedback.is_empty() {
            NO_ISSUES_FEEDBACK.to_string()
        } else {
            self.feedback.iter().join(FEEDBACK_SEPARATOR)
        }
    }
}

/// Running tally for one evaluation.
#[derive(Debug, Clone)]
pub struct Scorecard {
    /// Upper bound of the final score.
    max:      u32,
    /// Current tally; may dip below zero before clamping.
    score:    i64,
    /// Feedback collected so far.
    feedback: Vec<String>,
}

impl Scorecard {
    /// Starts at full marks and deducts.
    pub fn full(max: u32) -> Self {
        Self {
            max,
            score: i64::from(max),
            feedback: Vec::new(),
        }
    }

    /// Starts at zero and awards.
    pub fn empty(max: u32) -> Self {
        Self {
            max,
            score: 0,
            feedback: Vec::new(),
        }
    }

    /// Deducts `points` and records `feedback` unless `passed`.
    pub fn check(&mut self, passed: bool, points: u32, feedback: impl Into<String>) -> bool {
        if !passed {
            self.deduct(points, feedback);
        }
        passed
    }

    /// Deducts `points` and records `feedback`.
    pub fn deduct(&mut self, points: u32, feedback: impl Into<String>) {
        self.score -= i64::from(points);
        self.feedback.push(feedback.into());
    }

    /// Adds `points`.
    pub fn award(&mut self, points: u32) {
        self.score += i64::from(points);
    }

    /// Records feedback without changing the score.
    pub fn note(&mut self, feedback: impl Into<String>) {
        self.feedback.push(feedback.into());
    }

    /// Clamps and returns the result.
    pub fn finish(self) -> RubricResult {
        let score = self.score.clamp(0, i64::from(self.max));
        RubricResult {
            score:    u32::try_from(score).unwrap_or_default(),
            feedback: self.feedback,
        }
    }
}

/// What an evaluation knows besides the document.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    /// URL the document was fetched from; `None` for uploaded files.
    pub url:     Option<&'a Url>,
    /// Canonical key of the student.
    pub student: &'a str,
    /// Fetcher for rubrics that follow links.
    pub fetcher: &'a dyn Fetch,
}

/// Failures that stop an evaluation.
#[derive(thiserror::Error, Debug)]
pub enum EvaluationError {
    /// A page the rubric cannot do without could not be fetched.
    #[error("Failed to fetch website: {0}")]
    Fetch(#[from] FetchError),
    /// A rubric that follows links was run without a page URL.
    #[error("The {0} rubric needs the URL the page was fetched from.")]
    MissingPageUrl(&'static str),
}

/// A gradable assignment.
pub trait Rubric {
    /// Registered assignment name.
    fn name(&self) -> &'static str;

    /// Highest possible score.
    fn max_score(&self) -> u32;

    /// Score recorded when the submitted page cannot be fetched.
    fn fetch_failure_score(&self) -> u32 {
        0
    }

    /// Where the graded document comes from.
    fn source(&self) -> SubmissionSource {
        SubmissionSource::Hosted
    }

    /// Scores `doc`.
    fn evaluate(
        &self,
        doc: &Document,
        ctx: &EvalContext<'_>,
    ) -> Result<RubricResult, EvaluationError>;

    /// Result recorded when evaluation could not run at all.
    fn failure(&self, error: &EvaluationError) -> RubricResult {
        RubricResult {
            score:    self.fetch_failure_score().min(self.max_score()),
            feedback: vec![error.to_string()],
        }
    }
}

/// Raised when an assignment name is not registered.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown assignment `{name}`. Registered assignments: {known}")]
pub struct UnknownAssignment {
    /// Name that was asked for.
    pub name:  String,
    /// Comma-separated registered names.
    pub known: String,
}

/// Assignment name to rubric.
#[derive(Default)]
pub struct Registry {
    /// Registered rubrics, in registration order.
    rubrics: Vec<Box<dyn Rubric>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in rubric.
    pub fn standard() -> Self {
        Self::new()
            .with(FirstWebpage)
            .with(SecondWebpage)
            .with(FirstWebsite)
            .with(FirstWebsiteOnePage)
            .with(DungeonMap)
            .with(HtmlTest)
            .with(HeadingHr)
    }

    /// Adds `rubric`, replacing any rubric registered under the same name.
    pub fn with(mut self, rubric: impl Rubric + 'static) -> Self {
        self.register(Box::new(rubric));
        self
    }

    /// Adds `rubric`, replacing any rubric registered under the same name.
    pub fn register(&mut self, rubric: Box<dyn Rubric>) {
        self.rubrics.retain(|r| r.name() != rubric.name());
        self.rubrics.push(rubric);
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rubrics.iter().map(|r| r.name()).collect()
    }

    /// Looks up a rubric by name, ignoring case and surrounding whitespace.
    pub fn get(&self, name: &str) -> Result<&dyn Rubric, UnknownAssignment> {
        let wanted = name.trim();
        self.rubrics
            .iter()
            .find(|r| r.name().eq_ignore_ascii_case(wanted))
            .map(|r| r.as_ref())
            .ok_or_else(|| UnknownAssignment {
                name:  wanted.to_string(),
                known: self.names().join(", "),
            })
    }

    /// Iterates over the registered rubrics.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rubric> {
        self.rubrics.iter().map(|r| r.as_ref())
    }
}
