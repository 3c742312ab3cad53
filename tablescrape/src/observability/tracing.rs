//! Tracing integration for scrape runs.
//!
//! The library only emits `tracing` events; nothing is printed unless a
//! front-end installs a subscriber with [`init_tracing`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Flat record of one scrape invocation, logged when it ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeSpanAttributes {
    /// Requested URL.
    pub url: String,
    /// Per-invocation id, also attached to the `scrape` span.
    pub request_id: Option<String>,
    /// Status of the response, when one arrived.
    pub http_status: Option<u16>,
    /// Datasets extracted.
    pub dataset_count: Option<usize>,
    /// Wall-clock time of the whole invocation.
    pub duration_ms: Option<f64>,
    /// Failure message.
    pub error: Option<String>,
}

impl ScrapeSpanAttributes {
    /// Starts a record for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the request id.
    #[must_use]
    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            ..self
        }
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_http_status(self, status: u16) -> Self {
        Self {
            http_status: Some(status),
            ..self
        }
    }

    /// Sets the dataset count.
    #[must_use]
    pub fn with_dataset_count(self, count: usize) -> Self {
        Self {
            dataset_count: Some(count),
            ..self
        }
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(self, duration_ms: f64) -> Self {
        Self {
            duration_ms: Some(duration_ms),
            ..self
        }
    }

    /// Sets the failure message.
    #[must_use]
    pub fn with_error(self, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..self
        }
    }

    /// Dotted `scrape.*` / `http.*` keys, unset fields omitted.
    #[must_use]
    pub fn to_attributes(&self) -> BTreeMap<&'static str, String> {
        let optional = [
            ("scrape.request_id", self.request_id.clone()),
            ("http.status_code", self.http_status.map(|s| s.to_string())),
            ("scrape.dataset_count", self.dataset_count.map(|n| n.to_string())),
            ("scrape.duration_ms", self.duration_ms.map(|ms| format!("{ms:.1}"))),
            ("scrape.error", self.error.clone()),
        ];

        std::iter::once(("scrape.url", Some(self.url.clone())))
            .chain(optional)
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

/// Wall-clock timer for one traced operation.
#[derive(Debug)]
pub struct SpanTimer {
    label: &'static str,
    started: Instant,
}

impl SpanTimer {
    /// Starts timing.
    #[must_use]
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }

    /// Milliseconds since [`start`](Self::start).
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1e3
    }

    /// The operation being timed.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Stops the timer and returns the elapsed milliseconds.
    #[must_use]
    pub fn finish(self) -> f64 {
        let elapsed = self.elapsed_ms();
        tracing::trace!(operation = self.label, duration_ms = elapsed, "timer finished");
        elapsed
    }
}

/// Installs a global `fmt` subscriber.
///
/// `verbosity` 0 maps to `warn`, 1 to `info`, 2 to `debug` and anything
/// higher to `trace`. `RUST_LOG` takes precedence when set. Calling this
/// twice is harmless; the second call is ignored.
pub fn init_tracing(verbosity: u8, json: bool) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
