//! # Tablescrape
//!
//! Fetches a web page and turns whatever tables it contains into
//! rectangular datasets, alongside the page's stylesheet, script and image
//! references.
//!
//! - **Fetching**: one HTTP GET per page behind the pluggable [`fetch::Fetcher`] trait
//! - **Extraction**: tolerant table discovery and normalization on arbitrary HTML
//! - **Export**: CSV and XML serialization of any dataset
//! - **Scraping**: the fetch-then-extract pipeline, one page or many concurrently
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tablescrape::prelude::*;
//!
//! let scraper = Scraper::from_config(ScrapeConfig::default())?;
//! let result = scraper.scrape("https://example.com/hiscores", &ScrapeOptions::new()).await?;
//!
//! if let Some(dataset) = result.datasets.first() {
//!     let csv = export(dataset, ExportFormat::Csv)?;
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod errors;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod observability;
pub mod scrape;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ExtractionConfig, FetchConfig, ScrapeConfig};
    pub use crate::errors::{ErrorKind, ScrapeError};
    pub use crate::export::{export, to_csv, to_xml, CsvOptions, ExportFormat, XmlOptions};
    pub use crate::extract::{
        extract_resources, extract_tables, Dataset, Diagnostic, ExtractionResult, Extractor,
        ResourceSet,
    };
    pub use crate::fetch::{FetchResult, Fetcher, HttpFetcher};
    pub use crate::scrape::{ScrapeOptions, Scraper};
}
