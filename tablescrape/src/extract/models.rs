//! Data models for extraction results.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How a row was fitted to the dataset width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFit {
    /// The row already had the right number of cells.
    Exact,
    /// Missing cells were filled with empty strings.
    Padded,
    /// Extra cells were dropped.
    Truncated,
}

/// Fits `row` to exactly `width` cells.
#[must_use]
pub fn reconcile_row(mut row: Vec<String>, width: usize) -> (Vec<String>, RowFit) {
    let fit = match row.len().cmp(&width) {
        std::cmp::Ordering::Equal => RowFit::Exact,
        std::cmp::Ordering::Less => RowFit::Padded,
        std::cmp::Ordering::Greater => RowFit::Truncated,
    };
    row.resize(width, String::new());
    (row, fit)
}

/// A rectangular table of text cells.
///
/// Every row has exactly `column_names.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Unique column names, in column order.
    pub column_names: Vec<String>,
    /// Rows in document order.
    pub rows: Vec<Vec<String>>,
    /// The table's `<caption>` text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Dataset {
    /// Creates an empty dataset with the given columns.
    #[must_use]
    pub fn new(column_names: Vec<String>) -> Self {
        Self {
            column_names,
            rows: Vec::new(),
            caption: None,
        }
    }

    /// Sets the caption.
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Appends a row, padding or truncating it to the dataset width.
    pub fn push_row(&mut self, row: Vec<String>) -> RowFit {
        let (row, fit) = reconcile_row(row, self.width());
        self.rows.push(row);
        fit
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.column_names.len()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map_or("", String::as_str))
                .collect(),
        )
    }

    /// Concatenates datasets into one.
    ///
    /// Column names are the union of all inputs in first-seen order. Each
    /// row is placed by column name; columns a row's dataset lacks stay
    /// empty. Schema mismatches never fail.
    #[must_use]
    pub fn combine<'a, I>(datasets: I) -> Self
    where
        I: IntoIterator<Item = &'a Dataset>,
    {
        let mut column_names: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<Vec<String>> = Vec::new();

        for dataset in datasets {
            let mapping: Vec<usize> = dataset
                .column_names
                .iter()
                .map(|name| {
                    *positions.entry(name.clone()).or_insert_with(|| {
                        column_names.push(name.clone());
                        column_names.len() - 1
                    })
                })
                .collect();

            for row in &dataset.rows {
                let mut out = vec![String::new(); column_names.len()];
                for (cell, &target) in row.iter().zip(&mapping) {
                    out[target] = cell.clone();
                }
                rows.push(out);
            }
        }

        let width = column_names.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }

        Self {
            column_names,
            rows,
            caption: None,
        }
    }

    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("column_names".to_string(), serde_json::json!(self.column_names));
        dict.insert("rows".to_string(), serde_json::json!(self.rows));
        if let Some(ref caption) = self.caption {
            dict.insert("caption".to_string(), serde_json::json!(caption));
        }
        dict
    }
}

/// Resource references found on a page, as absolute URLs in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    /// `<link rel="stylesheet">` targets.
    pub stylesheets: Vec<String>,
    /// `<script src>` targets.
    pub scripts: Vec<String>,
    /// `<img src>` targets.
    pub images: Vec<String>,
}

impl ResourceSet {
    /// Total number of references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stylesheets.len() + self.scripts.len() + self.images.len()
    }

    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A non-fatal observation made during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The document contains no table elements at all.
    NoTablesFound,
    /// A table was found but yielded no data rows.
    EmptyTable {
        /// Dataset index.
        index: usize,
    },
    /// Rows of a table had to be padded or truncated.
    RaggedRows {
        /// Dataset index.
        index: usize,
        /// Rows that were too short.
        padded: usize,
        /// Rows that were too long.
        truncated: usize,
    },
    /// Tables nested inside a top-level table were not emitted.
    NestedTablesIgnored {
        /// Dataset index of the outer table.
        index: usize,
        /// Number of nested tables.
        count: usize,
    },
    /// The document could not be parsed.
    ParseFailed {
        /// Why parsing failed.
        reason: String,
    },
    /// A resource reference could not be made absolute.
    UnresolvedResource {
        /// The raw reference.
        reference: String,
        /// Why resolution failed.
        reason: String,
    },
}

impl Diagnostic {
    /// Whether this is the "no table present" state.
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoTablesFound)
    }

    /// Whether this reports a parse failure.
    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ParseFailed { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTablesFound => write!(f, "No tables found on the page"),
            Self::EmptyTable { index } => write!(f, "Table {index} has no data rows"),
            Self::RaggedRows {
                index,
                padded,
                truncated,
            } => write!(
                f,
                "Table {index}: padded {padded} short row(s), truncated {truncated} long row(s)"
            ),
            Self::NestedTablesIgnored { index, count } => {
                write!(f, "Table {index}: ignored {count} nested table(s)")
            }
            Self::ParseFailed { reason } => write!(f, "Document could not be parsed: {reason}"),
            Self::UnresolvedResource { reference, reason } => {
                write!(f, "Could not resolve resource '{reference}': {reason}")
            }
        }
    }
}

/// Output of the table pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableExtraction {
    /// One dataset per top-level table, in document order.
    pub datasets: Vec<Dataset>,
    /// Diagnostics from the pass.
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The page the content came from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Extracted datasets.
    pub datasets: Vec<Dataset>,
    /// Extracted resource references.
    pub resources: ResourceSet,
    /// Diagnostics from both passes.
    pub diagnostics: Vec<Diagnostic>,
}

impl ExtractionResult {
    /// Whether the page had no table at all.
    #[must_use]
    pub fn no_data_found(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_no_data)
    }

    /// Whether any dataset has at least one row.
    #[must_use]
    pub fn has_rows(&self) -> bool {
        self.datasets.iter().any(|d| !d.is_empty())
    }

    /// All datasets combined into one, or `None` when there are none.
    #[must_use]
    pub fn combined(&self) -> Option<Dataset> {
        if self.datasets.is_empty() {
            None
        } else {
            Some(Dataset::combine(&self.datasets))
        }
    }

    /// Replaces the datasets with their combination.
    pub fn combine_datasets(&mut self) {
        if let Some(combined) = self.combined() {
            self.datasets = vec![combined];
        }
    }

    /// Diagnostics rendered as messages.
    #[must_use]
    pub fn diagnostic_messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }
}
