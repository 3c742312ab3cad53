//! Test assertions for extraction results.

use crate::extract::{Dataset, Diagnostic, ExtractionResult};

/// Asserts that every row has exactly one cell per column.
pub fn assert_rectangular(dataset: &Dataset) {
    let width = dataset.width();
    for (i, row) in dataset.rows.iter().enumerate() {
        assert_eq!(
            row.len(),
            width,
            "Row {i} has {} cells, expected {width}",
            row.len()
        );
    }
}

/// Asserts the number of rows and columns.
pub fn assert_dataset_shape(dataset: &Dataset, rows: usize, columns: usize) {
    assert_eq!(
        (dataset.len(), dataset.width()),
        (rows, columns),
        "Expected {rows}x{columns} dataset, got {}x{}",
        dataset.len(),
        dataset.width()
    );
    assert_rectangular(dataset);
}

/// Asserts the column names.
pub fn assert_columns(dataset: &Dataset, expected: &[&str]) {
    assert_eq!(
        dataset.column_names, expected,
        "Expected columns {:?}, got {:?}",
        expected, dataset.column_names
    );
}

/// Asserts that `expected` is among the diagnostics.
pub fn assert_has_diagnostic(diagnostics: &[Diagnostic], expected: &Diagnostic) {
    assert!(
        diagnostics.contains(expected),
        "Expected diagnostic {expected:?}, got {diagnostics:?}"
    );
}

/// Asserts the "no table present" outcome: no datasets and a
/// [`Diagnostic::NoTablesFound`].
pub fn assert_no_data(result: &ExtractionResult) {
    assert!(
        result.datasets.is_empty() && result.no_data_found(),
        "Expected no data, got {} dataset(s) and diagnostics {:?}",
        result.datasets.len(),
        result.diagnostics
    );
}
