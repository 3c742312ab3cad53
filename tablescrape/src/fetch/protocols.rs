//! The fetcher seam and its success value.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::errors::ScrapeError;

/// A page that came back with a 2xx status.
///
/// Failures never produce a `FetchResult`; they are returned as
/// [`ScrapeError::Network`] or [`ScrapeError::HttpStatus`].
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Status of the response, always 2xx.
    pub status_code: u16,
    /// Selected response headers, lowercase names.
    pub headers: HashMap<String, String>,
    /// Body decoded as text.
    pub text: String,
    /// URL the body was served from, after redirects. Relative resource
    /// references resolve against it.
    pub final_url: String,
    /// `Content-Type` header value, if sent.
    pub content_type: Option<String>,
    /// Request round trip.
    pub duration_ms: f64,
    /// Receipt time.
    pub fetched_at: DateTime<Utc>,
}

impl FetchResult {
    /// A 200 HTML page served from `url`.
    #[must_use]
    pub fn ok(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            headers: HashMap::new(),
            text: text.into(),
            final_url: url.into(),
            content_type: Some("text/html; charset=utf-8".into()),
            duration_ms: 0.0,
            fetched_at: Utc::now(),
        }
    }

    /// True for HTML and XHTML bodies, and when no content type was sent.
    #[must_use]
    pub fn is_html(&self) -> bool {
        match self.content_type.as_deref() {
            Some(ct) => ct.contains("text/html") || ct.contains("application/xhtml"),
            None => true,
        }
    }
}

/// Retrieves one page per call.
///
/// Implementations never retry and never return a non-2xx page as `Ok`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GETs `url`.
    ///
    /// `timeout` replaces the configured timeout for this call and
    /// `headers` are layered over the configured headers.
    async fn fetch(
        &self,
        url: &str,
        timeout: Option<Duration>,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<FetchResult, ScrapeError>;

    /// Settings this fetcher was built with.
    fn config(&self) -> &FetchConfig;
}
