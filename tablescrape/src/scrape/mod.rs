//! The fetch-then-extract pipeline.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{ExtractionConfig, ScrapeConfig};
use crate::errors::ScrapeError;
use crate::extract::{ExtractionResult, Extractor};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::observability::{ScrapeSpanAttributes, SpanTimer};

mod integration_tests;

/// Per-invocation options.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Headers merged over the fetcher's configured headers.
    pub headers: HashMap<String, String>,
    /// Replace the datasets with their combination.
    pub combine: bool,
    /// Overrides the fetcher's timeout for this invocation.
    pub timeout: Option<Duration>,
}

impl ScrapeOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Requests combined output.
    #[must_use]
    pub fn combined(mut self) -> Self {
        self.combine = true;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Fetches pages and extracts their tables and resources.
///
/// Invocations share nothing but the fetcher, so one scraper can run any
/// number of them concurrently.
#[derive(Debug)]
pub struct Scraper<F: Fetcher = HttpFetcher> {
    fetcher: F,
    extractor: Extractor,
}

impl Scraper<HttpFetcher> {
    /// Creates an HTTP scraper from configuration.
    pub fn from_config(config: ScrapeConfig) -> Result<Self, ScrapeError> {
        Ok(Self::new(HttpFetcher::new(config.fetch)?, config.extraction))
    }
}

impl<F: Fetcher> Scraper<F> {
    /// Creates a scraper around any fetcher.
    #[must_use]
    pub fn new(fetcher: F, config: ExtractionConfig) -> Self {
        Self {
            fetcher,
            extractor: Extractor::new(config),
        }
    }

    /// Gets the fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Gets the extractor.
    #[must_use]
    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Fetches `url` and extracts it.
    ///
    /// Fetch failures are returned as errors and nothing is extracted. A
    /// page without tables is a success with a
    /// [`Diagnostic::NoTablesFound`](crate::extract::Diagnostic::NoTablesFound).
    pub async fn scrape(
        &self,
        url: &str,
        options: &ScrapeOptions,
    ) -> Result<ExtractionResult, ScrapeError> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("scrape", request_id = %request_id, url);

        async move {
            let timer = SpanTimer::start("scrape");
            let attrs = ScrapeSpanAttributes::new(url).with_request_id(request_id);

            let outcome = self.run(url, options).await;
            let attrs = attrs.with_duration_ms(timer.finish());
            match &outcome {
                Ok((status, result)) => {
                    let attrs = attrs
                        .with_http_status(*status)
                        .with_dataset_count(result.datasets.len());
                    info!(
                        datasets = result.datasets.len(),
                        resources = result.resources.len(),
                        diagnostics = result.diagnostics.len(),
                        "Scrape complete"
                    );
                    debug!(attributes = ?attrs.to_attributes(), "Scrape attributes");
                }
                Err(e) => {
                    let attrs = attrs.with_error(e.to_string());
                    warn!(error = %e, kind = %e.kind(), "Scrape failed");
                    debug!(attributes = ?attrs.to_attributes(), "Scrape attributes");
                }
            }
            outcome.map(|(_, result)| result)
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        url: &str,
        options: &ScrapeOptions,
    ) -> Result<(u16, ExtractionResult), ScrapeError> {
        let headers = (!options.headers.is_empty()).then_some(&options.headers);
        let page = self.fetcher.fetch(url, options.timeout, headers).await?;

        if !page.is_html() {
            debug!(content_type = ?page.content_type, "Response is not declared as HTML");
        }

        let mut result = self.extractor.extract(&page.text, &page.final_url);
        if options.combine {
            result.combine_datasets();
        }
        Ok((page.status_code, result))
    }

    /// Scrapes several URLs with at most `concurrency` in flight.
    ///
    /// Results come back in input order; one failure does not affect the
    /// others.
    pub async fn scrape_many<S>(
        &self,
        urls: &[S],
        options: &ScrapeOptions,
        concurrency: usize,
    ) -> Vec<Result<ExtractionResult, ScrapeError>>
    where
        S: AsRef<str>,
    {
        stream::iter(urls.iter().map(|url| self.scrape(url.as_ref(), options)))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
