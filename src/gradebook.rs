#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Handing grades to the gradebook.
//!
//! The gradebook is a paged list of students that shows one entry at a time.
//! [`submit`] walks it, matches each shown name against the pending records
//! by canonical key, and writes the score and feedback. An entry that keeps
//! failing is retried a bounded number of times and then skipped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    constants::GRADEBOOK_ATTEMPTS,
    grade::{GradingBatch, GradingRecord},
    names, util,
};

/// Failures reported by a gradebook.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GradebookError {
    /// The current entry could not be read.
    #[error("Could not read the current gradebook entry: {0}")]
    Unreadable(String),
    /// Writing a grade failed.
    #[error("Could not write the grade for {key}: {message}")]
    WriteFailed {
        /// Key of the record being written.
        key:     String,
        /// What the gradebook reported.
        message: String,
    },
    /// Moving to the next entry failed.
    #[error("Could not move to the next gradebook entry: {0}")]
    Navigation(String),
}

/// The entry a gradebook is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradebookEntry {
    /// Student name as displayed.
    pub display_name:  String,
    /// Whether the gradebook flags this entry as waiting for a grade.
    pub needs_grading: bool,
    /// Score already entered, if any.
    pub current_score: Option<u32>,
}

/// A paged gradebook showing one student at a time.
pub trait Gradebook {
    /// The entry on screen, or `None` when nothing is shown.
    fn current_entry(&mut self) -> Result<Option<GradebookEntry>, GradebookError>;

    /// Writes score and feedback into the entry on screen.
    fn write(&mut self, record: &GradingRecord) -> Result<(), GradebookError>;

    /// Moves to the next entry; `false` when there is none.
    fn advance(&mut self) -> Result<bool, GradebookError>;
}

/// What happened during one [`submit`] run, by canonical key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionSummary {
    /// Records whose grade was written.
    pub written:   Vec<String>,
    /// Records whose grade was already in place.
    pub unchanged: Vec<String>,
    /// Displayed names that never matched a pending record.
    pub unmatched: Vec<String>,
    /// Records that were never reached.
    pub pending:   Vec<String>,
}

impl SubmissionSummary {
    /// Whether every record reached the gradebook.
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// How [`submit`] treats entries that are already graded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitOptions {
    /// Also visit entries the gradebook does not flag as needing a grade.
    pub update_all: bool,
}

/// Result of one attempt at the entry on screen.
enum Attempt {
    /// The grade was written for this key.
    Written(String),
    /// The same grade was already entered for this key.
    Unchanged(String),
    /// The entry is graded already and is left alone.
    Skipped,
    /// The displayed name matched no pending record.
    NoMatch(String),
}

/// Walks the gradebook and writes every record of `batch` it can match.
///
/// Each entry gets [`GRADEBOOK_ATTEMPTS`] tries. Matching is exact equality
/// of canonical keys. The walk ends when every record is written or the
/// gradebook has no further entry.
pub fn submit(
    gradebook: &mut dyn Gradebook,
    batch: &GradingBatch,
    options: SubmitOptions,
) -> SubmissionSummary {
    let mut pending: Vec<GradingRecord> = batch.records().to_vec();
    let mut summary = SubmissionSummary::default();

    while !pending.is_empty() {
        let mut settled = false;
        let mut last_name = None;

        for attempt in 1..=GRADEBOOK_ATTEMPTS {
            match try_entry(gradebook, &mut pending, options) {
                Ok(Attempt::Written(key)) => {
                    tracing::info!("Grade entered for {key}");
                    summary.written.push(key);
                    settled = true;
                }
                Ok(Attempt::Unchanged(key)) => {
                    tracing::info!("Grade for {key} already entered");
                    summary.unchanged.push(key);
                    settled = true;
                }
                Ok(Attempt::Skipped) => settled = true,
                Ok(Attempt::NoMatch(name)) => {
                    tracing::debug!("Attempt {attempt}: no record for {name}");
                    last_name = Some(name);
                }
                Err(e) => tracing::warn!("Attempt {attempt}: {e}"),
            }
            if settled {
                break;
            }
        }

        if !settled {
            let name = last_name.unwrap_or_default();
            tracing::warn!(
                "Skipping `{name}` after {GRADEBOOK_ATTEMPTS} attempts, {} records remaining",
                pending.len()
            );
            summary.unmatched.push(name);
        }

        match gradebook.advance() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                tracing::warn!("{e}");
                break;
            }
        }
    }

    summary.pending = pending.into_iter().map(|r| r.canonical_key).collect();
    summary
}

/// One try at the entry on screen.
fn try_entry(
    gradebook: &mut dyn Gradebook,
    pending: &mut Vec<GradingRecord>,
    options: SubmitOptions,
) -> Result<Attempt, GradebookError> {
    let entry = gradebook
        .current_entry()?
        .ok_or_else(|| GradebookError::Unreadable("no entry is shown".into()))?;
    if !entry.needs_grading && !options.update_all {
        return Ok(Attempt::Skipped);
    }

    let key = names::key_from_display_name(&entry.display_name)
        .map_err(|e| GradebookError::Unreadable(e.to_string()))?;
    let Some(idx) = pending.iter().position(|r| r.canonical_key == key) else {
        return Ok(Attempt::NoMatch(entry.display_name));
    };

    if entry.current_score == Some(pending[idx].score) {
        pending.remove(idx);
        return Ok(Attempt::Unchanged(key));
    }
    gradebook.write(&pending[idx])?;
    pending.remove(idx);
    Ok(Attempt::Written(key))
}

/// Writes the batch as `(key, score, feedback)` triples for an external
/// gradebook automation.
#[derive(Debug, Clone)]
pub struct JsonHandoff {
    /// Destination file.
    path: PathBuf,
}

impl JsonHandoff {
    /// Hands off through the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `batch` in hand-off order, replacing any earlier file.
    pub fn write(&self, batch: &GradingBatch) -> Result<()> {
        let json = serde_json::to_string_pretty(batch.records())
            .context("Could not serialize grading records")?;
        util::write_replacing(&self.path, json.as_bytes())?;
        tracing::info!(
            "Handed off {} records to {}",
            batch.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Reads a hand-off file back.
    pub fn read(&self) -> Result<Vec<GradingRecord>> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Could not read {}", self.path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("{} is not a valid hand-off file", self.path.display()))
    }
}

