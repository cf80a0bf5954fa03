#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Deciding what a submitted file is before anything is fetched.
//!
//! Checks run in a fixed order and the first match wins: image upload, no
//! URL, loopback URL, malformed URL, otherwise a candidate for grading.
//! A redirect directive always takes precedence over a plain hyperlink.

use std::{fs, net::IpAddr, path::Path};

use url::{Host, Url};

use crate::{
    constants::{IMAGE_EXTENSIONS, LOOPBACK_HOSTS, REJECTED_SCORE},
    html::{Document, HEADINGS},
};

/// Where the graded document comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionSource {
    /// The uploaded file links to a hosted page, which is fetched and graded.
    Hosted,
    /// The uploaded file itself is graded; links are not accepted.
    Uploaded,
}

/// A URL pulled out of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    /// Text exactly as found in the submission, trimmed.
    pub raw:       String,
    /// Whether the URL has both a scheme and a host.
    pub validated: bool,
    /// Whether the URL points at the grading machine itself.
    pub is_local:  bool,
}

impl ResolvedUrl {
    /// Resolves `raw` into its validated form.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into().trim().to_string();
        let parsed = parse_usable(&raw);
        let is_local = is_local_url(&raw, parsed.as_ref());
        Self {
            validated: parsed.is_some(),
            raw,
            is_local,
        }
    }

    /// Parsed URL, if usable.
    pub fn url(&self) -> Option<Url> {
        parse_usable(&self.raw)
    }
}

/// Why a submission was turned away without grading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// An image or other non-HTML asset was uploaded.
    WrongFileType {
        /// Extension of the uploaded file.
        extension: String,
    },
    /// No redirect or hyperlink was found.
    NoUrl,
    /// The URL points at a loopback address.
    LocalAddress {
        /// The submitted URL.
        url: String,
    },
    /// The URL lacks a scheme or a host.
    InvalidUrl {
        /// The submitted URL.
        url: String,
    },
    /// A link was uploaded where the page itself was expected.
    UrlInsteadOfFile {
        /// The submitted URL.
        url: String,
    },
    /// The file could not be read as text.
    Unreadable {
        /// Underlying error text.
        message: String,
    },
}

impl Rejection {
    /// Score recorded for a rejected submission.
    pub fn score(&self) -> u32 {
        REJECTED_SCORE
    }

    /// Feedback line explaining the rejection to the student.
    pub fn feedback(&self) -> String {
        match self {
            Rejection::WrongFileType { extension } => format!(
                "Submitted the wrong file type (.{extension}). Please resubmit the assignment \
                 with the proper HTML file."
            ),
            Rejection::NoUrl => {
                "No valid URL found in the submission. Please resubmit with a valid URL."
                    .to_string()
            }
            Rejection::LocalAddress { url } => format!(
                "Submitted a URL pointing to a local IP address ({url}). Please resubmit with a \
                 valid online URL."
            ),
            Rejection::InvalidUrl { url } => format!(
                "The submitted URL ({url}) is not a complete web address. Please resubmit with a \
                 valid URL."
            ),
            Rejection::UrlInsteadOfFile { url } => format!(
                "Submitted a URL ({url}). Please resubmit the assignment with the proper HTML \
                 file."
            ),
            Rejection::Unreadable { message } => format!("Error processing file: {message}"),
        }
    }
}

/// Result of classifying one submitted file.
#[derive(Debug)]
pub enum Classification {
    /// A hosted page that should be fetched and graded.
    Hosted(ResolvedUrl),
    /// An uploaded page that should be graded as is.
    Uploaded(Document),
    /// Turned away before grading.
    Rejected(Rejection),
}

/// Classifies the file at `path`.
pub fn classify_file(path: &Path, source: SubmissionSource) -> Classification {
    if let Some(extension) = image_extension(path) {
        return Classification::Rejected(Rejection::WrongFileType { extension });
    }

    let contents = match fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                return Classification::Rejected(Rejection::Unreadable {
                    message: e.to_string(),
                });
            }
        },
        Err(e) => {
            return Classification::Rejected(Rejection::Unreadable {
                message: e.to_string(),
            });
        }
    };

    classify_contents(&contents, source)
}

/// Classifies already-read file contents.
pub fn classify_contents(contents: &str, source: SubmissionSource) -> Classification {
    let doc = Document::parse(contents);
    match source {
        SubmissionSource::Hosted => match extract_url(&doc) {
            None => Classification::Rejected(Rejection::NoUrl),
            Some(raw) => {
                let resolved = ResolvedUrl::new(raw);
                if resolved.is_local {
                    Classification::Rejected(Rejection::LocalAddress { url: resolved.raw })
                } else if !resolved.validated {
                    Classification::Rejected(Rejection::InvalidUrl { url: resolved.raw })
                } else {
                    Classification::Hosted(resolved)
                }
            }
        },
        SubmissionSource::Uploaded => match link_only_url(&doc) {
            Some(raw) => {
                let resolved = ResolvedUrl::new(raw);
                if resolved.is_local {
                    Classification::Rejected(Rejection::LocalAddress { url: resolved.raw })
                } else {
                    Classification::Rejected(Rejection::UrlInsteadOfFile { url: resolved.raw })
                }
            }
            None => Classification::Uploaded(doc),
        },
    }
}

/// Extracts the submitted URL: the refresh redirect first, then the first
/// hyperlink.
pub fn extract_url(doc: &Document) -> Option<String> {
    redirect_target(doc).or_else(|| {
        doc.find_all(&["a"])
            .into_iter()
            .find_map(|a| a.attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
    })
}

/// Target of a `<meta http-equiv="refresh" content="0; url=...">` directive.
fn redirect_target(doc: &Document) -> Option<String> {
    doc.find_all(&["meta"]).into_iter().find_map(|meta| {
        let equiv = meta.attr("http-equiv")?;
        if !equiv.trim().eq_ignore_ascii_case("refresh") {
            return None;
        }
        let content = meta.attr("content")?;
        let lower = content.to_ascii_lowercase();
        let idx = lower.rfind("url=")?;
        let target = content[idx + 4..]
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();
        (!target.is_empty()).then(|| target.to_string())
    })
}

/// For uploaded-file grading: the URL of a file that is nothing but a
/// redirect or a lone link.
fn link_only_url(doc: &Document) -> Option<String> {
    if let Some(target) = redirect_target(doc) {
        return Some(target);
    }

    let anchors = doc.find_all(&["a"]);
    let has_content = !doc.find_all(HEADINGS).is_empty()
        || doc.find_first("p").is_some()
        || doc.find_first("hr").is_some();
    match anchors.as_slice() {
        [only] if !has_content => only.attr("href").map(|h| h.trim().to_string()),
        _ => None,
    }
}

/// Lower-cased extension of `path` when it names an image.
fn image_extension(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// Parses `raw` and keeps it only when it has a scheme and a host.
fn parse_usable(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    (has_host && !url.scheme().is_empty()).then_some(url)
}

/// Loopback detection runs on the raw text too, so a malformed local URL is
/// still reported as local.
pub fn is_local_url(raw: &str, parsed: Option<&Url>) -> bool {
    let lower = raw.to_ascii_lowercase();
    if LOOPBACK_HOSTS.iter().any(|host| lower.contains(host)) {
        return true;
    }

    match parsed.and_then(Url::host) {
        Some(Host::Ipv4(ip)) => is_loopback(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_loopback(IpAddr::V6(ip)),
        _ => false,
    }
}

/// Loopback or unspecified address.
fn is_loopback(ip: IpAddr) -> bool {
    ip.is_loopback() || ip.is_unspecified()
}
