//! HTTP fetching.
//!
//! This module provides:
//! - The [`Fetcher`] protocol trait and its [`FetchResult`]
//! - [`HttpFetcher`], the reqwest-backed implementation
//! - URL and header validation helpers

mod http;
mod protocols;

pub use http::{build_headers, validate_url, HttpFetcher};
pub use protocols::{FetchResult, Fetcher};
