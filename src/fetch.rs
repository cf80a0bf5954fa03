#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Retrieving submitted pages.
//!
//! Certificates are never validated: student pages live on whatever free host
//! they found, and many of them serve broken chains. Fetched bodies are
//! untrusted input.

use std::{
    cell::RefCell,
    collections::HashMap,
    error::Error as _,
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use url::Url;

use crate::{config::GraderConfig, util};

/// Broad class of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchReason {
    /// The request did not finish within the timeout.
    Timeout,
    /// The server answered with a non-success status.
    HttpError,
    /// The TLS handshake failed.
    TlsError,
    /// Anything else on the way: DNS, refused connection, broken body.
    ConnectionError,
}

/// A failed fetch, carrying the URL and the underlying error text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request timed out.
    #[error("timed out requesting {url}: {message}")]
    Timeout {
        /// URL that was requested.
        url:     String,
        /// Underlying error text.
        message: String,
    },
    /// Non-success HTTP status.
    #[error("HTTP {status} for {url}")]
    Http {
        /// URL that was requested.
        url:    String,
        /// Status code returned by the server.
        status: u16,
    },
    /// TLS handshake failure.
    #[error("TLS error requesting {url}: {message}")]
    Tls {
        /// URL that was requested.
        url:     String,
        /// Underlying error text.
        message: String,
    },
    /// Connection or transport failure.
    #[error("could not connect to {url}: {message}")]
    Connection {
        /// URL that was requested.
        url:     String,
        /// Underlying error text.
        message: String,
    },
}

impl FetchError {
    /// Returns the class of this failure.
    pub fn reason(&self) -> FetchReason {
        match self {
            FetchError::Timeout { .. } => FetchReason::Timeout,
            FetchError::Http { .. } => FetchReason::HttpError,
            FetchError::Tls { .. } => FetchReason::TlsError,
            FetchError::Connection { .. } => FetchReason::ConnectionError,
        }
    }
}

/// Something that can turn a URL into a document body.
pub trait Fetch {
    /// Retrieves the body behind `url`.
    fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP fetcher used for real grading runs.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// Shared client with certificate validation disabled.
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the given timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to construct HTTP client")?;
        Ok(Self { client })
    }

    /// Builds a fetcher from the run configuration.
    pub fn from_config(config: &GraderConfig) -> Result<Self> {
        Self::new(config.timeout(), config.user_agent())
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| classify(url, e))?
            .error_for_status()
            .map_err(|e| classify(url, e))?;
        response.text().map_err(|e| classify(url, e))
    }
}

/// Maps a reqwest error onto the fetch failure taxonomy.
fn classify(url: &Url, err: reqwest::Error) -> FetchError {
    let url_str = url.to_string();
    if let Some(status) = err.status() {
        return FetchError::Http {
            url:    url_str,
            status: status.as_u16(),
        };
    }

    let message = error_chain(&err);
    if err.is_timeout() {
        FetchError::Timeout {
            url: url_str,
            message,
        }
    } else if looks_like_tls(&message) {
        FetchError::Tls {
            url: url_str,
            message,
        }
    } else {
        FetchError::Connection {
            url: url_str,
            message,
        }
    }
}

/// Joins an error with all of its sources.
fn error_chain(err: &reqwest::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

/// reqwest exposes no TLS predicate, so the error text decides.
fn looks_like_tls(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["tls", "ssl", "certificate", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// In-memory fetcher serving canned pages. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StaticPages {
    /// Canned responses keyed by normalized URL.
    pages:    HashMap<String, Result<String, FetchError>>,
    /// Every URL requested so far, in order.
    requests: RefCell<Vec<String>>,
}

impl StaticPages {
    /// Creates an empty set of pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`.
    pub fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(normalize(url), Ok(body.into()));
        self
    }

    /// Fails every request for `url` with `error`.
    pub fn with_failure(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(normalize(url), Err(error));
        self
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

/// Normalizes a URL string the same way `Url` prints it.
fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

impl Fetch for StaticPages {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let key = url.to_string();
        self.requests.borrow_mut().push(key.clone());
        match self.pages.get(&key) {
            Some(response) => response.clone(),
            None => Err(FetchError::Http {
                url:    key,
                status: 404,
            }),
        }
    }
}

/// Keeps a copy of every fetched submission for later audit.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    /// Directory receiving the documents.
    dir: PathBuf,
}

impl DocumentStore {
    /// Stores documents under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a document for `key` and `assignment` is stored at.
    pub fn path_for(&self, key: &str, assignment: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.html", key, util::slug(assignment)))
    }

    /// Saves `body`, replacing any earlier copy for the same key.
    pub fn save(&self, key: &str, assignment: &str, body: &str) -> Result<PathBuf> {
        let path = self.path_for(key, assignment);
        util::write_replacing(&path, body.as_bytes())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_is_recognized_from_the_error_text() {
        assert!(looks_like_tls("invalid peer certificate: UnknownIssuer"));
        assert!(looks_like_tls("received fatal alert: HandshakeFailure"));
        assert!(looks_like_tls("TLS error"));
        assert!(!looks_like_tls("tcp connect error: Connection refused (os error 111)"));
        assert!(!looks_like_tls("dns error: failed to lookup address information"));
    }

    #[test]
    fn request_errors_without_status_are_connection_failures() {
        let url = Url::parse("https://amy.example/").unwrap();
        let err = reqwest::blocking::Client::new()
            .get("http://")
            .send()
            .unwrap_err();
        let classified = classify(&url, err);
        assert_eq!(classified.reason(), FetchReason::ConnectionError);
        assert!(matches!(
            classified,
            FetchError::Connection { url, .. } if url == "https://amy.example/"
        ));
    }
}
