//! # webgrade
//!
//! Grades HTML coursework. Submissions are pulled out of an archive,
//! resolved to the page each student published, fetched, and scored against
//! a fixed rubric for the assignment.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Unpacking the submissions archive
pub mod archive;
/// Deciding what a submitted file is before anything is fetched
pub mod classify;
/// Run configuration passed explicitly into the grader
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Retrieving submitted pages and keeping copies of them
pub mod fetch;
/// For grading a batch of submitted files
pub mod grade;
/// Handing grades to the gradebook
pub mod gradebook;
/// Typed queries over parsed HTML
pub mod html;
/// Canonical student keys
pub mod names;
/// Results directory layout
pub mod paths;
/// The CSV report and the terminal summary
pub mod report;
/// Per-assignment rubrics and the registry selecting them
pub mod rubric;
/// Utility functions for convenience
pub mod util;

pub use config::GraderConfig;
pub use grade::{GradingBatch, GradingRecord, Grader, Submission, grade_archive};
pub use rubric::{Registry, Rubric, RubricResult};
