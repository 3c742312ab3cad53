//! CSV serialization.
//!
//! Minimal RFC 4180 writer and reader. Every value is written as text; no
//! type inference happens in either direction.

use crate::errors::ScrapeError;
use crate::extract::Dataset;

/// CSV writing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field separator.
    pub delimiter: char,
    /// Whether the column names are written as the first record.
    pub include_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }
}

impl CsvOptions {
    /// Sets the delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Omits the header record.
    #[must_use]
    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }
}

fn needs_quotes(field: &str, delimiter: char) -> bool {
    field
        .chars()
        .any(|c| c == delimiter || matches!(c, '"' | '\r' | '\n'))
}

fn write_record(out: &mut String, record: &[String], delimiter: char) {
    // A lone empty field would otherwise read back as a blank line.
    if let [only] = record {
        if only.is_empty() {
            out.push_str("\"\"\n");
            return;
        }
    }

    for (i, field) in record.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        if needs_quotes(field, delimiter) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Serializes a dataset as comma-separated UTF-8 with a header record.
#[must_use]
pub fn to_csv(dataset: &Dataset) -> Vec<u8> {
    to_csv_with(dataset, &CsvOptions::default())
}

/// Serializes a dataset with explicit options.
///
/// An empty column list writes no header record.
#[must_use]
pub fn to_csv_with(dataset: &Dataset, options: &CsvOptions) -> Vec<u8> {
    let mut out = String::new();
    if options.include_header && !dataset.column_names.is_empty() {
        write_record(&mut out, &dataset.column_names, options.delimiter);
    }
    for row in &dataset.rows {
        write_record(&mut out, row, options.delimiter);
    }
    out.into_bytes()
}

/// Reads CSV text into records.
///
/// Accepts quoted fields with doubled quotes, embedded newlines and CRLF
/// line endings. Blank lines are skipped.
pub fn parse_csv(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, ScrapeError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            c if c == delimiter => {
                record.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                if !record.is_empty() || !field.is_empty() || quoted {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                quoted = false;
            }
            c => field.push(c),
        }
    }

    if in_quotes {
        return Err(ScrapeError::Parse("unterminated quoted field".to_string()));
    }
    if !record.is_empty() || !field.is_empty() || quoted {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

/// Rebuilds a dataset from CSV text.
///
/// With `include_header` the first record supplies the column names,
/// otherwise columns are named by position.
pub fn dataset_from_csv(text: &str, options: &CsvOptions) -> Result<Dataset, ScrapeError> {
    let records = parse_csv(text, options.delimiter)?;

    let (column_names, rows) = if options.include_header {
        let mut records = records.into_iter();
        let header = records.next().unwrap_or_default();
        (header, records.collect::<Vec<_>>())
    } else {
        let width = records.iter().map(Vec::len).max().unwrap_or(0);
        ((0..width).map(|i| i.to_string()).collect(), records)
    };

    let mut dataset = Dataset::new(column_names);
    for row in rows {
        dataset.push_row(row);
    }
    Ok(dataset)
}
