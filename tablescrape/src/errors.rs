//! Error types for tablescrape.
//!
//! Every failure the core can produce is a [`ScrapeError`] value. Conditions
//! that are not failures (a page without tables, a table without rows) are
//! reported as [`crate::extract::Diagnostic`]s on the result instead.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Coarse classification of a [`ScrapeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller supplied something unusable (URL, header).
    InvalidInput,
    /// Transport failure: DNS, connection, timeout, redirects.
    Network,
    /// The server answered with a non-2xx status.
    HttpStatus,
    /// The document could not be parsed at all.
    Parse,
    /// A dataset could not be serialized or written.
    Export,
}

impl ErrorKind {
    /// Returns the kind as a stable string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Network => "network_error",
            Self::HttpStatus => "http_status_error",
            Self::Parse => "parse_error",
            Self::Export => "export_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for tablescrape operations.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The URL is not an absolute http(s) URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A request header name or value is not valid HTTP.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader {
        /// The header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request never produced a response.
    #[error("Network error fetching {url}: {reason}")]
    Network {
        /// The requested URL.
        url: String,
        /// Description of the transport failure.
        reason: String,
        /// Whether the failure was the request timeout.
        timed_out: bool,
    },

    /// The server answered with a non-success status.
    #[error("HTTP error {status} fetching {url}")]
    HttpStatus {
        /// The requested URL.
        url: String,
        /// The response status code.
        status: u16,
    },

    /// The response body exceeded the configured limit.
    #[error("Response from {url} exceeds {limit} bytes")]
    ResponseTooLarge {
        /// The requested URL.
        url: String,
        /// The configured limit in bytes.
        limit: usize,
    },

    /// The document could not be tokenized.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A dataset could not be exported.
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Creates an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid header error.
    #[must_use]
    pub fn invalid_header(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(url: impl Into<String>, reason: impl Into<String>, timed_out: bool) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
            timed_out,
        }
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } | Self::InvalidHeader { .. } => ErrorKind::InvalidInput,
            Self::Network { .. } | Self::ResponseTooLarge { .. } => ErrorKind::Network,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Export(_) | Self::Serialization(_) | Self::Io(_) => ErrorKind::Export,
        }
    }

    /// The HTTP status carried by the error, if any.
    #[must_use]
    pub fn http_status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error was a request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { timed_out: true, .. })
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("kind".to_string(), serde_json::json!(self.kind().as_str()));

        match self {
            Self::InvalidUrl { url, .. }
            | Self::Network { url, .. }
            | Self::ResponseTooLarge { url, .. } => {
                map.insert("url".to_string(), serde_json::json!(url));
            }
            Self::HttpStatus { url, status } => {
                map.insert("url".to_string(), serde_json::json!(url));
                map.insert("http_status".to_string(), serde_json::json!(status));
            }
            Self::InvalidHeader { name, .. } => {
                map.insert("header".to_string(), serde_json::json!(name));
            }
            _ => {}
        }
        if let Self::Network { timed_out, .. } = self {
            map.insert("timed_out".to_string(), serde_json::json!(timed_out));
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_error() {
        let err = ScrapeError::http_status("https://example.com/missing", 404);

        assert_eq!(err.kind(), ErrorKind::HttpStatus);
        assert_eq!(err.http_status_code(), Some(404));
        assert_eq!(err.to_string(), "HTTP error 404 fetching https://example.com/missing");
    }

    #[test]
    fn test_network_error_timeout_flag() {
        let err = ScrapeError::network("https://example.com", "operation timed out", true);

        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.is_timeout());
        assert_eq!(err.http_status_code(), None);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ScrapeError::invalid_url("x", "relative").kind(), ErrorKind::InvalidInput);
        assert_eq!(ScrapeError::invalid_header("X Bad", "space").kind(), ErrorKind::InvalidInput);
        assert_eq!(ScrapeError::Parse("bad bytes".into()).kind(), ErrorKind::Parse);
        assert_eq!(ScrapeError::Export("bad name".into()).kind(), ErrorKind::Export);
    }

    #[test]
    fn test_to_dict() {
        let err = ScrapeError::http_status("https://example.com", 503);
        let dict = err.to_dict();

        assert_eq!(dict.get("kind"), Some(&serde_json::json!("http_status_error")));
        assert_eq!(dict.get("http_status"), Some(&serde_json::json!(503)));
        assert_eq!(dict.get("url"), Some(&serde_json::json!("https://example.com")));
    }

    #[test]
    fn test_network_to_dict_has_timeout() {
        let dict = ScrapeError::network("https://example.com", "refused", false).to_dict();
        assert_eq!(dict.get("timed_out"), Some(&serde_json::json!(false)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ScrapeError = io.into();
        assert_eq!(err.kind(), ErrorKind::Export);
    }
}
