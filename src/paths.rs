#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Results directory layout.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use bon::builder;
use serde::{Deserialize, Serialize};

use crate::constants::{CSV_DIR, FETCHED_PAGES_DIR, HANDOFF_FILE, PULLED_HTML_DIR, REPORT_FILE};

/// Represents the fixed folders a grading run writes into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsPaths {
    /// Root of the results folder chosen by the operator.
    root:          PathBuf,
    /// Files extracted from the submissions archive.
    pulled_html:   PathBuf,
    /// Raw bodies of every fetched submission, kept for manual audit.
    fetched_pages: PathBuf,
    /// Directory holding the tabular report.
    csv_dir:       PathBuf,
}

impl ResultsPaths {
    /// Creates the standard layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::build_with_defaults(root.into(), None, None, None)
    }

    /// Root of the results folder.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Directory the archive is extracted into.
    pub fn pulled_html(&self) -> &Path {
        self.pulled_html.as_path()
    }

    /// Directory fetched documents are saved into.
    pub fn fetched_pages(&self) -> &Path {
        self.fetched_pages.as_path()
    }

    /// Directory holding the report.
    pub fn csv_dir(&self) -> &Path {
        self.csv_dir.as_path()
    }

    /// Full path of the tabular report.
    pub fn report_file(&self) -> PathBuf {
        self.csv_dir.join(REPORT_FILE)
    }

    /// Full path of the gradebook hand-off file.
    pub fn handoff_file(&self) -> PathBuf {
        self.root.join(HANDOFF_FILE)
    }

    /// Creates every directory of the layout if absent.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.root, &self.pulled_html, &self.fetched_pages, &self.csv_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Could not create results directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Centralized constructor that applies standard defaults when overrides
    /// are absent.
    fn build_with_defaults(
        root: PathBuf,
        pulled_html: Option<PathBuf>,
        fetched_pages: Option<PathBuf>,
        csv_dir: Option<PathBuf>,
    ) -> Self {
        let pulled_html = pulled_html.unwrap_or_else(|| root.join(PULLED_HTML_DIR));
        let fetched_pages = fetched_pages.unwrap_or_else(|| root.join(FETCHED_PAGES_DIR));
        let csv_dir = csv_dir.unwrap_or_else(|| root.join(CSV_DIR));

        Self {
            root,
            pulled_html,
            fetched_pages,
            csv_dir,
        }
    }
}

/// Builder-friendly constructor for `ResultsPaths` with optional overrides.
#[builder(finish_fn = build)]
pub fn results_paths(
    #[builder(into)] root: PathBuf,
    pulled_html: Option<PathBuf>,
    fetched_pages: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
) -> ResultsPaths {
    ResultsPaths::build_with_defaults(root, pulled_html, fetched_pages, csv_dir)
}
