//! Extraction entry points.

use tracing::{debug, warn};

use super::document::Document;
use super::models::{Diagnostic, ExtractionResult, ResourceSet, TableExtraction};
use super::resources::collect_resources;
use super::tables::collect_tables;
use crate::config::ExtractionConfig;

/// Runs the table and resource passes over HTML documents.
///
/// Stateless apart from its configuration; one instance can serve any
/// number of documents from any number of tasks.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    /// Creates an extractor.
    #[must_use]
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn oversized(&self, len: usize) -> Option<Diagnostic> {
        (len > self.config.max_document_bytes).then(|| Diagnostic::ParseFailed {
            reason: format!(
                "document is {len} bytes, limit is {}",
                self.config.max_document_bytes
            ),
        })
    }

    /// Table pass only.
    #[must_use]
    pub fn extract_tables(&self, html: &str) -> TableExtraction {
        if let Some(diagnostic) = self.oversized(html.len()) {
            return TableExtraction {
                datasets: Vec::new(),
                diagnostics: vec![diagnostic],
            };
        }
        collect_tables(&Document::parse(html), self.config.expand_spans)
    }

    /// Resource pass only.
    #[must_use]
    pub fn extract_resources(&self, html: &str, base_url: &str) -> (ResourceSet, Vec<Diagnostic>) {
        if let Some(diagnostic) = self.oversized(html.len()) {
            return (ResourceSet::default(), vec![diagnostic]);
        }
        collect_resources(&Document::parse(html), base_url)
    }

    /// Parses once and runs both passes.
    ///
    /// Never fails: unusable input yields an empty result with a
    /// [`Diagnostic::ParseFailed`].
    #[must_use]
    pub fn extract(&self, html: &str, base_url: &str) -> ExtractionResult {
        let mut result = ExtractionResult {
            source_url: (!base_url.is_empty()).then(|| base_url.to_string()),
            ..Default::default()
        };

        if let Some(diagnostic) = self.oversized(html.len()) {
            warn!(bytes = html.len(), "Document too large, skipping extraction");
            result.diagnostics.push(diagnostic);
            return result;
        }

        let doc = Document::parse(html);
        if doc.parse_error_count() > 0 {
            debug!(errors = doc.parse_error_count(), "Recovered from markup errors");
        }
        self.run_passes(&doc, base_url, &mut result);
        result
    }

    /// Like [`extract`](Self::extract) for raw bytes, which must be UTF-8.
    #[must_use]
    pub fn extract_bytes(&self, bytes: &[u8], base_url: &str) -> ExtractionResult {
        let mut result = ExtractionResult {
            source_url: (!base_url.is_empty()).then(|| base_url.to_string()),
            ..Default::default()
        };

        if let Some(diagnostic) = self.oversized(bytes.len()) {
            result.diagnostics.push(diagnostic);
            return result;
        }

        match Document::from_bytes(bytes) {
            Ok(doc) => self.run_passes(&doc, base_url, &mut result),
            Err(e) => {
                warn!(error = %e, "Document could not be decoded");
                result.diagnostics.push(Diagnostic::ParseFailed {
                    reason: e.to_string(),
                });
            }
        }
        result
    }

    fn run_passes(&self, doc: &Document, base_url: &str, result: &mut ExtractionResult) {
        let tables = collect_tables(doc, self.config.expand_spans);
        result.datasets = tables.datasets;
        result.diagnostics.extend(tables.diagnostics);

        if self.config.collect_resources {
            let (resources, diagnostics) = collect_resources(doc, base_url);
            result.resources = resources;
            result.diagnostics.extend(diagnostics);
        }

        debug!(
            datasets = result.datasets.len(),
            resources = result.resources.len(),
            diagnostics = result.diagnostics.len(),
            "Extraction complete"
        );
    }
}

/// Extracts tables with the default configuration.
#[must_use]
pub fn extract_tables(html: &str) -> TableExtraction {
    Extractor::default().extract_tables(html)
}

/// Extracts resource references with the default configuration.
#[must_use]
pub fn extract_resources(html: &str, base_url: &str) -> ResourceSet {
    Extractor::default().extract_resources(html, base_url).0
}
