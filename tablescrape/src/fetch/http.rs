//! Async HTTP fetcher wrapping reqwest.
//!
//! Not a browser, just one GET per call. Redirects are followed, status
//! codes are enforced, and there is no retry: backoff policy belongs to
//! the caller.

use async_trait::async_trait;
use chrono::Utc;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::protocols::{FetchResult, Fetcher};
use crate::config::FetchConfig;
use crate::errors::ScrapeError;
use crate::observability::SpanTimer;

/// Response headers copied into [`FetchResult::headers`].
const KEPT_HEADERS: &[&str] = &[
    "content-type",
    "content-language",
    "last-modified",
    "cache-control",
    "etag",
];

/// Checks that `url` is an absolute http(s) URL with a host.
pub fn validate_url(url: &str) -> Result<Url, ScrapeError> {
    let parsed =
        Url::parse(url.trim()).map_err(|e| ScrapeError::invalid_url(url, e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ScrapeError::invalid_url(
                url,
                format!("unsupported scheme '{other}'"),
            ))
        }
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ScrapeError::invalid_url(url, "missing host"));
    }

    Ok(parsed)
}

/// Builds a header map from configured headers with per-call overrides on top.
pub fn build_headers(
    base: &BTreeMap<String, String>,
    overrides: Option<&HashMap<String, String>>,
) -> Result<HeaderMap, ScrapeError> {
    let mut map = HeaderMap::new();

    for (name, value) in base.iter().chain(overrides.into_iter().flatten()) {
        let header_name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| ScrapeError::invalid_header(name, e.to_string()))?;
        let header_value = HeaderValue::from_str(value.trim())
            .map_err(|e| ScrapeError::invalid_header(name, e.to_string()))?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}

fn transport_error(url: &str, err: &reqwest::Error) -> ScrapeError {
    let mut reason = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        reason.push_str(": ");
        reason.push_str(&inner.to_string());
        source = inner.source();
    }
    ScrapeError::network(url, reason, err.is_timeout())
}

fn too_large(url: &str, limit: usize) -> ScrapeError {
    ScrapeError::ResponseTooLarge {
        url: url.to_string(),
        limit,
    }
}

/// Reads the body, failing as soon as more than `limit` wire bytes arrive.
async fn read_body(
    mut response: reqwest::Response,
    url: &str,
    limit: usize,
) -> Result<Vec<u8>, ScrapeError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| transport_error(url, &e))? {
        if body.len() + chunk.len() > limit {
            return Err(too_large(url, limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// The `charset` parameter of a `Content-Type` value.
fn declared_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decodes with the declared charset, UTF-8 when absent or unknown.
///
/// A byte order mark overrides the declared charset. Malformed sequences
/// become U+FFFD.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(declared_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

/// reqwest-backed [`Fetcher`].
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration.
    pub fn new(config: FetchConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| {
                ScrapeError::network("", format!("failed to build HTTP client: {e}"), false)
            })?;

        Ok(Self { client, config })
    }

    /// Creates a fetcher around an existing client.
    ///
    /// The client's own timeout and user agent apply; `config` still
    /// supplies headers and the response size limit.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: FetchConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        timeout: Option<Duration>,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<FetchResult, ScrapeError> {
        let target = validate_url(url)?;
        let header_map = build_headers(&self.config.headers, headers)?;
        let timer = SpanTimer::start("fetch");

        debug!(url = %target, "Fetching page");

        let mut request = self.client.get(target).headers(header_map);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Non-success status");
            return Err(ScrapeError::http_status(url, status.as_u16()));
        }

        let limit = self.config.max_response_size;
        let declared_too_large = response
            .content_length()
            .is_some_and(|len| len > u64::try_from(limit).unwrap_or(u64::MAX));
        if declared_too_large {
            return Err(too_large(url, limit));
        }

        let final_url = response.url().to_string();
        let kept: HashMap<String, String> = response
            .headers()
            .iter()
            .filter(|(k, _)| KEPT_HEADERS.contains(&k.as_str()))
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let content_type = kept.get("content-type").cloned();

        let body = read_body(response, url, limit).await?;
        let text = decode_body(&body, content_type.as_deref());

        let duration_ms = timer.finish();
        info!(
            url,
            status = status.as_u16(),
            bytes = body.len(),
            duration_ms,
            "Fetched page"
        );

        Ok(FetchResult {
            status_code: status.as_u16(),
            headers: kept,
            text,
            final_url,
            content_type,
            duration_ms,
            fetched_at: Utc::now(),
        })
    }

    fn config(&self) -> &FetchConfig {
        &self.config
    }
}
