//! Dataset export to CSV and XML.

mod csv;
mod xml;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use self::csv::{dataset_from_csv, parse_csv, to_csv, to_csv_with, CsvOptions};
pub use self::xml::{sanitize_element_name, strip_invalid_xml_chars, to_xml, XmlOptions};

use crate::errors::ScrapeError;
use crate::extract::Dataset;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// XML document.
    Xml,
}

impl ExportFormat {
    /// MIME type of the exported bytes.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Xml => "application/xml",
        }
    }

    /// File extension without the dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xml => "xml",
        }
    }

    /// Suggested download file name.
    #[must_use]
    pub fn default_filename(&self) -> String {
        format!("scraped_data.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            other => Err(ScrapeError::Export(format!("unknown export format '{other}'"))),
        }
    }
}

/// Serializes a dataset in the given format with default options.
pub fn export(dataset: &Dataset, format: ExportFormat) -> Result<Vec<u8>, ScrapeError> {
    match format {
        ExportFormat::Csv => Ok(to_csv(dataset)),
        ExportFormat::Xml => to_xml(dataset, &XmlOptions::default()),
    }
}
