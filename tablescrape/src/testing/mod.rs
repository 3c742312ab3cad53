//! Testing utilities for scrapers.
//!
//! This module provides:
//! - A mock fetcher with canned responses
//! - HTML fixtures
//! - Dataset and diagnostic assertions

mod assertions;
pub mod fixtures;
mod mocks;

pub use assertions::{
    assert_columns, assert_dataset_shape, assert_has_diagnostic, assert_no_data,
    assert_rectangular,
};
pub use mocks::{MockFetcher, MockResponse, RecordedFetch};
