//! Mock fetchers for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::errors::ScrapeError;
use crate::fetch::{validate_url, FetchResult, Fetcher};

/// A canned answer for one URL.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with this HTML body.
    Page(String),
    /// A non-success status.
    Status(u16),
    /// A transport failure with this reason.
    NetworkError(String),
}

/// One recorded call to [`MockFetcher::fetch`].
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    /// Requested URL.
    pub url: String,
    /// Per-call timeout.
    pub timeout: Option<Duration>,
    /// Per-call headers.
    pub headers: HashMap<String, String>,
}

/// A fetcher that serves canned responses and records calls.
///
/// URLs without a registered response answer with 404.
#[derive(Debug, Default)]
pub struct MockFetcher {
    config: FetchConfig,
    responses: Mutex<HashMap<String, MockResponse>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedFetch>>,
}

impl MockFetcher {
    /// Creates a mock fetcher with no responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` for `url`.
    #[must_use]
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.set_response(url, MockResponse::Page(html.into()));
        self
    }

    /// Answers `url` with a non-success status.
    #[must_use]
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.set_response(url, MockResponse::Status(status));
        self
    }

    /// Fails `url` with a transport error.
    #[must_use]
    pub fn with_network_error(self, url: impl Into<String>, reason: impl Into<String>) -> Self {
        self.set_response(url, MockResponse::NetworkError(reason.into()));
        self
    }

    /// Sleeps before every response.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Registers or replaces the response for `url`.
    pub fn set_response(&self, url: impl Into<String>, response: MockResponse) {
        self.responses.lock().insert(url.into(), response);
    }

    /// Returns the number of fetches.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns all recorded fetches.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedFetch> {
        self.calls.lock().clone()
    }

    /// Clears recorded fetches.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(
        &self,
        url: &str,
        timeout: Option<Duration>,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<FetchResult, ScrapeError> {
        validate_url(url)?;
        self.calls.lock().push(RecordedFetch {
            url: url.to_string(),
            timeout,
            headers: headers.cloned().unwrap_or_default(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.responses.lock().get(url).cloned();
        match response {
            Some(MockResponse::Page(html)) => Ok(FetchResult::ok(url, html)),
            Some(MockResponse::Status(status)) => Err(ScrapeError::http_status(url, status)),
            Some(MockResponse::NetworkError(reason)) => Err(ScrapeError::network(url, reason, false)),
            None => Err(ScrapeError::http_status(url, 404)),
        }
    }

    fn config(&self) -> &FetchConfig {
        &self.config
    }
}
