//! Configuration types for fetching and extraction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Browser-like identity sent when the caller does not supply a user agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Request identity and limits for page fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "timeout_secs")]
    pub timeout_seconds: f64,
    /// Redirect hops followed before the fetch fails.
    #[serde(default = "redirect_limit")]
    pub max_redirects: usize,
    /// User agent string.
    #[serde(default = "browser_user_agent")]
    pub user_agent: String,
    /// Whether TLS certificates are checked.
    #[serde(default = "enabled")]
    pub verify_ssl: bool,
    /// Bodies larger than this many bytes are rejected.
    #[serde(default = "response_limit")]
    pub max_response_size: usize,
    /// Headers sent with every request; per-call headers override them.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn timeout_secs() -> f64 {
    30.0
}

fn redirect_limit() -> usize {
    10
}

fn browser_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn enabled() -> bool {
    true
}

fn response_limit() -> usize {
    10 * 1024 * 1024
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: timeout_secs(),
            max_redirects: redirect_limit(),
            user_agent: browser_user_agent(),
            verify_ssl: true,
            max_response_size: response_limit(),
            headers: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    /// Browser-like defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, secs: f64) -> Self {
        self.timeout_seconds = secs;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the maximum response size.
    #[must_use]
    pub fn with_max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }

    /// The timeout as a [`Duration`]; unusable values mean 30 seconds.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        let fallback = Duration::from_secs(30);
        if self.timeout_seconds > 0.0 {
            Duration::try_from_secs_f64(self.timeout_seconds).unwrap_or(fallback)
        } else {
            fallback
        }
    }
}

/// Configuration for table and resource extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Documents larger than this are rejected with a parse diagnostic.
    #[serde(default = "document_limit")]
    pub max_document_bytes: usize,
    /// Whether `colspan`/`rowspan` cells are repeated into every slot they cover.
    #[serde(default = "enabled")]
    pub expand_spans: bool,
    /// Whether the resource pass runs.
    #[serde(default = "enabled")]
    pub collect_resources: bool,
}

fn document_limit() -> usize {
    50 * 1024 * 1024
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: document_limit(),
            expand_spans: true,
            collect_resources: true,
        }
    }
}

impl ExtractionConfig {
    /// Defaults: spans expanded, resources collected, 50 MiB limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document size limit.
    #[must_use]
    pub fn with_max_document_bytes(mut self, bytes: usize) -> Self {
        self.max_document_bytes = bytes;
        self
    }

    /// Disables span expansion; every cell then occupies a single slot.
    #[must_use]
    pub fn without_span_expansion(mut self) -> Self {
        self.expand_spans = false;
        self
    }

    /// Disables the resource pass.
    #[must_use]
    pub fn without_resources(mut self) -> Self {
        self.collect_resources = false;
        self
    }
}

/// Combined configuration, as loaded by front-ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// How pages are requested.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// How pages are taken apart.
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl ScrapeConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> crate::errors::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_seconds, 30.0);
        assert_eq!(config.max_redirects, 10);
        assert!(config.verify_ssl);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_fetch_config_builder() {
        let config = FetchConfig::new()
            .with_timeout(60.0)
            .with_user_agent("custom-agent")
            .with_header("Accept-Language", "en");

        assert_eq!(config.timeout_seconds, 60.0);
        assert_eq!(config.user_agent, "custom-agent");
        assert_eq!(config.headers.get("Accept-Language"), Some(&"en".to_string()));
    }

    #[test]
    fn test_timeout_falls_back_on_nonsense() {
        let config = FetchConfig::new().with_timeout(-1.0);
        assert_eq!(config.timeout(), Duration::from_secs(30));

        let config = FetchConfig::new().with_timeout(f64::NAN);
        assert_eq!(config.timeout(), Duration::from_secs(30));

        let config = FetchConfig::new().with_timeout(2.5);
        assert_eq!(config.timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_timeout_out_of_range_from_json() {
        let config = ScrapeConfig::from_json(r#"{"fetch":{"timeout_seconds":1e20}}"#).unwrap();
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));

        let config = FetchConfig::new().with_timeout(f64::INFINITY);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_extraction_config_defaults() {
        let config = ExtractionConfig::default();
        assert!(config.expand_spans);
        assert!(config.collect_resources);

        let config = config.without_span_expansion().without_resources();
        assert!(!config.expand_spans);
        assert!(!config.collect_resources);
    }

    #[test]
    fn test_scrape_config_partial_json() {
        let config = ScrapeConfig::from_json(r#"{"fetch": {"timeout_seconds": 5}}"#).unwrap();

        assert_eq!(config.fetch.timeout_seconds, 5.0);
        assert_eq!(config.fetch.max_redirects, 10);
        assert!(config.extraction.expand_spans);
    }

    #[test]
    fn test_scrape_config_invalid_json() {
        let err = ScrapeConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::errors::ScrapeError::Serialization(_)));
    }
}
