#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Run configuration passed explicitly into the grader.

use std::{path::PathBuf, time::Duration};

use bon::Builder;

use crate::{
    constants::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT},
    paths::ResultsPaths,
};

/// Everything one grading run needs to know up front.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct GraderConfig {
    /// Zip archive holding the submissions. When absent the files already in
    /// the extraction directory are graded.
    #[builder(into)]
    archive:     Option<PathBuf>,
    /// Root of the results folder.
    #[builder(into)]
    results_dir: PathBuf,
    /// Registered assignment name selecting the rubric.
    assignment:  String,
    /// Timeout applied to every HTTP request.
    #[builder(default = timeout_from_env())]
    timeout:     Duration,
    /// User agent sent with every HTTP request.
    #[builder(default = user_agent_from_env())]
    user_agent:  String,
}

impl GraderConfig {
    /// Archive to extract, if any.
    pub fn archive(&self) -> Option<&PathBuf> {
        self.archive.as_ref()
    }

    /// Assignment name as given by the operator.
    pub fn assignment(&self) -> &str {
        &self.assignment
    }

    /// HTTP timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// HTTP user agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Results folder layout derived from `results_dir`.
    pub fn paths(&self) -> ResultsPaths {
        ResultsPaths::new(self.results_dir.clone())
    }
}

/// Reads `WEBGRADE_TIMEOUT_SECS`, falling back to the default timeout.
pub fn timeout_from_env() -> Duration {
    read_timeout_secs("WEBGRADE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
}

/// Reads `WEBGRADE_USER_AGENT`, falling back to the crate's own agent string.
pub fn user_agent_from_env() -> String {
    std::env::var("WEBGRADE_USER_AGENT")
        .map(|value| value.trim().to_owned())
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
