//! XML serialization.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::errors::ScrapeError;
use crate::extract::Dataset;

/// Element names used for the document and its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOptions {
    /// Name of the document element.
    pub root_tag: String,
    /// Name of each row element.
    pub row_tag: String,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            root_tag: "data".to_string(),
            row_tag: "row".to_string(),
        }
    }
}

impl XmlOptions {
    /// Sets the root tag.
    #[must_use]
    pub fn with_root_tag(mut self, tag: impl Into<String>) -> Self {
        self.root_tag = tag.into();
        self
    }

    /// Sets the row tag.
    #[must_use]
    pub fn with_row_tag(mut self, tag: impl Into<String>) -> Self {
        self.row_tag = tag.into();
        self
    }
}

#[allow(clippy::expect_used)]
fn invalid_name_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("name regex is valid"))
}

/// Whether `c` matches the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Drops characters XML 1.0 cannot represent, even as references.
#[must_use]
pub fn strip_invalid_xml_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

/// Turns an arbitrary column name into a valid XML element name.
///
/// `index` is the column position, used when nothing usable is left.
#[must_use]
pub fn sanitize_element_name(name: &str, index: usize) -> String {
    let visible = strip_invalid_xml_chars(name);
    let cleaned = invalid_name_chars().replace_all(visible.trim(), "_");
    if cleaned.chars().all(|c| c == '_') {
        return format!("col_{index}");
    }

    let reserved = cleaned.len() >= 3 && cleaned[..3].eq_ignore_ascii_case("xml");
    let bad_start = cleaned
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '-');
    if reserved || bad_start {
        format!("_{cleaned}")
    } else {
        cleaned.into_owned()
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ScrapeError> {
    writer
        .write_event(event)
        .map_err(|e| ScrapeError::Export(e.to_string()))
}

/// Serializes a dataset as an XML document.
///
/// One `row_tag` element per row under `root_tag`, with one child per
/// column named after the sanitized column name.
pub fn to_xml(dataset: &Dataset, options: &XmlOptions) -> Result<Vec<u8>, ScrapeError> {
    let root = sanitize_element_name(&options.root_tag, 0);
    let row_tag = sanitize_element_name(&options.row_tag, 0);
    let names: Vec<String> = dataset
        .column_names
        .iter()
        .enumerate()
        .map(|(i, name)| sanitize_element_name(name, i))
        .collect();

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;

    if dataset.is_empty() {
        write(&mut writer, Event::Empty(BytesStart::new(root.as_str())))?;
        return Ok(writer.into_inner());
    }

    write(&mut writer, Event::Start(BytesStart::new(root.as_str())))?;
    for row in &dataset.rows {
        write(&mut writer, Event::Start(BytesStart::new(row_tag.as_str())))?;
        for (name, value) in names.iter().zip(row) {
            let value = strip_invalid_xml_chars(value);
            if value.is_empty() {
                write(&mut writer, Event::Empty(BytesStart::new(name.as_str())))?;
            } else {
                write(&mut writer, Event::Start(BytesStart::new(name.as_str())))?;
                write(&mut writer, Event::Text(BytesText::new(&value)))?;
                write(&mut writer, Event::End(BytesEnd::new(name.as_str())))?;
            }
        }
        write(&mut writer, Event::End(BytesEnd::new(row_tag.as_str())))?;
    }
    write(&mut writer, Event::End(BytesEnd::new(root.as_str())))?;

    Ok(writer.into_inner())
}
