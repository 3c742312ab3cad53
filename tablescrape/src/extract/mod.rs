//! HTML table and resource extraction.
//!
//! Arbitrary, unknown-structure HTML goes in; rectangular [`Dataset`]s and
//! absolute resource URLs come out. Malformed markup is repaired by the
//! HTML5 parser and never fails extraction. Anything noteworthy is
//! reported as a [`Diagnostic`] on the result.

mod document;
mod extractor;
mod models;
mod resources;
mod tables;

pub use document::{element_text, normalize_ws, Document};
pub use extractor::{extract_resources, extract_tables, Extractor};
pub use models::{
    reconcile_row, Dataset, Diagnostic, ExtractionResult, ResourceSet, RowFit, TableExtraction,
};
pub use resources::collect_resources;
pub use tables::collect_tables;
