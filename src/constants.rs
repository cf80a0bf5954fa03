#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Token in a submission filename that marks it as turned in after the due
/// date.
pub const LATE_MARKER: &str = "_LATE_";

/// File extensions that are rejected outright as image uploads.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "svg"];

/// Hosts that always mark a submitted URL as pointing at the grader's own
/// machine.
pub const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Score given to any submission rejected before grading.
pub const REJECTED_SCORE: u32 = 1;

/// Feedback used when every rubric check passed.
pub const NO_ISSUES_FEEDBACK: &str = "Good job!";

/// Separator used when joining feedback lines into a single string.
pub const FEEDBACK_SEPARATOR: &str = "; ";

/// Subdirectory of the results folder that receives the extracted archive.
pub const PULLED_HTML_DIR: &str = "pulled_html";

/// Subdirectory of the results folder that caches fetched documents.
pub const FETCHED_PAGES_DIR: &str = "fetched_pages";

/// Subdirectory of the results folder that holds the tabular report.
pub const CSV_DIR: &str = "csv";

/// File name of the tabular report.
pub const REPORT_FILE: &str = "grading_results.csv";

/// File name of the gradebook hand-off written next to the report.
pub const HANDOFF_FILE: &str = "handoff.json";

/// Default timeout for every HTTP request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default user agent sent with every HTTP request.
pub const DEFAULT_USER_AGENT: &str = concat!("webgrade/", env!("CARGO_PKG_VERSION"));

/// Number of times a gradebook entry is retried before it is dropped.
pub const GRADEBOOK_ATTEMPTS: usize = 3;
