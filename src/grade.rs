#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grading a batch of submitted files.
//!
//! Each file moves through classify, fetch, evaluate and record on its own.
//! Whatever goes wrong with one file becomes a low score and a feedback line
//! for that file; only setup failures reach the caller.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bon::Builder;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use url::Url;

use crate::{
    archive,
    classify::{Classification, classify_file},
    config::GraderConfig,
    constants::REJECTED_SCORE,
    fetch::{DocumentStore, Fetch},
    html::Document,
    names::{self, NameError},
    report::{self, ReportRow},
    rubric::{EvalContext, EvaluationError, Registry, Rubric, RubricResult},
    util,
};

/// One extracted file, identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// File name exactly as found in the archive.
    pub raw_identifier: String,
    /// Key used to match the student elsewhere.
    pub canonical_key:  String,
    /// Where the file was extracted to.
    pub source_file:    PathBuf,
    /// Whether the file name carries the late marker.
    pub is_late:        bool,
}

impl Submission {
    /// Identifies the file at `path` by its name.
    pub fn from_path(path: &Path) -> Result<Self, NameError> {
        let raw_identifier = file_name(path);
        Ok(Self {
            canonical_key: names::key_from_filename(&raw_identifier)?,
            is_late: names::is_late(&raw_identifier),
            source_file: path.to_path_buf(),
            raw_identifier,
        })
    }
}

/// Score and feedback for one student, ready for the gradebook.
#[derive(Tabled, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GradingRecord {
    /// Key used to match the student in the gradebook.
    #[tabled(rename = "Student")]
    pub canonical_key: String,
    /// Points earned.
    #[tabled(rename = "Score")]
    pub score:         u32,
    /// Feedback lines joined into one string.
    #[tabled(rename = "Feedback")]
    pub feedback:      String,
}

impl GradingRecord {
    /// Builds a record from a rubric result.
    pub fn new(canonical_key: impl Into<String>, result: &RubricResult) -> Self {
        Self {
            canonical_key: canonical_key.into(),
            score:         result.score,
            feedback:      result.joined_feedback(),
        }
    }
}

/// Records of one run: on-time submissions sorted by key, then late
/// submissions sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GradingBatch {
    /// All records in hand-off order.
    records:  Vec<GradingRecord>,
    /// Index of the first late record.
    late_idx: usize,
}

impl GradingBatch {
    /// Orders the two partitions and concatenates them.
    pub fn new(mut on_time: Vec<GradingRecord>, mut late: Vec<GradingRecord>) -> Self {
        on_time.sort_by(|a, b| a.canonical_key.cmp(&b.canonical_key));
        late.sort_by(|a, b| a.canonical_key.cmp(&b.canonical_key));
        let late_idx = on_time.len();
        on_time.extend(late);
        Self {
            records: on_time,
            late_idx,
        }
    }

    /// Every record in hand-off order.
    pub fn records(&self) -> &[GradingRecord] {
        &self.records
    }

    /// On-time records.
    pub fn on_time(&self) -> &[GradingRecord] {
        &self.records[..self.late_idx]
    }

    /// Late records.
    pub fn late(&self) -> &[GradingRecord] {
        &self.records[self.late_idx..]
    }

    /// Canonical keys in hand-off order.
    pub fn keys(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.canonical_key.as_str())
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What happened to one file.
struct Outcome {
    /// Row for the report.
    row:     ReportRow,
    /// Record for the gradebook.
    record:  GradingRecord,
    /// Whether the record belongs to the late partition.
    is_late: bool,
}

/// Runs one rubric over a set of files.
#[derive(Builder)]
pub struct Grader<'a> {
    /// Rubric applied to every submission.
    rubric:  &'a dyn Rubric,
    /// Source of hosted pages.
    fetcher: &'a dyn Fetch,
    /// Keeps a copy of every fetched page.
    store:   DocumentStore,
    /// Where the report is written.
    #[builder(into)]
    report:  PathBuf,
}

impl Grader<'_> {
    /// Grades every file in `files`, in file name order, writes the report
    /// and returns the batch.
    pub fn run(&self, files: &[PathBuf]) -> Result<GradingBatch> {
        let mut files = files.to_vec();
        files.sort();

        tracing::info!(
            "Grading {} files for `{}`",
            files.len(),
            self.rubric.name()
        );

        let outcomes: Vec<Outcome> = files.iter().map(|path| self.grade_file(path)).collect();

        let rows: Vec<ReportRow> = outcomes.iter().map(|o| o.row.clone()).collect();
        report::write_report(&self.report, &rows)?;

        let (late, on_time): (Vec<Outcome>, Vec<Outcome>) =
            outcomes.into_iter().partition(|o| o.is_late);
        Ok(GradingBatch::new(
            on_time.into_iter().map(|o| o.record).collect(),
            late.into_iter().map(|o| o.record).collect(),
        ))
    }

    /// Grades one file; never fails.
    fn grade_file(&self, path: &Path) -> Outcome {
        let name = file_name(path);
        let is_late = names::is_late(&name);

        let (key, result) = match Submission::from_path(path) {
            Ok(submission) => {
                let result = self.grade_submission(&submission);
                (submission.canonical_key, result)
            }
            Err(e) => {
                tracing::warn!("{name}: {e}");
                let result = RubricResult {
                    score:    REJECTED_SCORE,
                    feedback: vec![e.to_string()],
                };
                (name.clone(), result)
            }
        };

        tracing::info!("{name}: {}/{}", result.score, self.rubric.max_score());
        let record = GradingRecord::new(key, &result);
        Outcome {
            row: ReportRow {
                file:     name,
                score:    record.score,
                feedback: record.feedback.clone(),
            },
            record,
            is_late,
        }
    }

    /// Classifies, fetches when needed, and evaluates.
    fn grade_submission(&self, submission: &Submission) -> RubricResult {
        match classify_file(&submission.source_file, self.rubric.source()) {
            Classification::Rejected(rejection) => {
                tracing::debug!("{}: rejected: {rejection:?}", submission.raw_identifier);
                RubricResult {
                    score:    rejection.score(),
                    feedback: vec![rejection.feedback()],
                }
            }
            Classification::Uploaded(doc) => self.evaluate(&doc, &self.context(submission, None)),
            Classification::Hosted(resolved) => {
                let Some(url) = resolved.url() else {
                    return RubricResult {
                        score:    REJECTED_SCORE,
                        feedback: vec![format!("Could not parse URL {}", resolved.raw)],
                    };
                };
                let body = match self.fetcher.fetch(&url) {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::warn!("{}: {e}", submission.raw_identifier);
                        return self.rubric.failure(&EvaluationError::Fetch(e));
                    }
                };
                if let Err(e) =
                    self.store
                        .save(&submission.canonical_key, self.rubric.name(), &body)
                {
                    tracing::warn!("Could not keep a copy of {url}: {e:#}");
                }
                self.evaluate(&Document::parse(body), &self.context(submission, Some(&url)))
            }
        }
    }

    /// What the rubric gets to know about `submission`.
    fn context<'c>(&'c self, submission: &'c Submission, url: Option<&'c Url>) -> EvalContext<'c> {
        EvalContext {
            url,
            student: &submission.canonical_key,
            fetcher: self.fetcher,
        }
    }

    /// Runs the rubric, turning an evaluation error into its failure result.
    fn evaluate(&self, doc: &Document, ctx: &EvalContext<'_>) -> RubricResult {
        self.rubric.evaluate(doc, ctx).unwrap_or_else(|e| {
            tracing::warn!("{}: {e}", ctx.student);
            self.rubric.failure(&e)
        })
    }
}

/// Sets up the results folder, extracts the archive and grades every file.
///
/// Fails only when the assignment is unknown or the setup fails; everything
/// that goes wrong with an individual file ends up in that file's record.
pub fn grade_archive(
    config: &GraderConfig,
    registry: &Registry,
    fetcher: &dyn Fetch,
) -> Result<GradingBatch> {
    let rubric = registry.get(config.assignment())?;
    let paths = config.paths();
    paths.ensure()?;

    let files = match config.archive() {
        Some(archive) => archive::extract_archive(archive, paths.pulled_html())?,
        None => util::list_files(paths.pulled_html()).with_context(|| {
            format!("Could not list submissions in {}", paths.pulled_html().display())
        })?,
    };

    Grader::builder()
        .rubric(rubric)
        .fetcher(fetcher)
        .store(DocumentStore::new(paths.fetched_pages()))
        .report(paths.report_file())
        .build()
        .run(&files)
}

/// File name component of `path`, lossily decoded.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
