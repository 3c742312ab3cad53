//! Parsed HTML documents and text helpers.

use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::errors::ScrapeError;

/// Elements whose text never contributes to a cell.
const SKIPPED_TEXT: &[&str] = &["script", "style", "template", "noscript"];

/// Elements that separate words when flattened to text.
const BLOCK_ELEMENTS: &[&str] = &[
    "br", "p", "div", "li", "ul", "ol", "dl", "dt", "dd", "h1", "h2", "h3", "h4", "h5", "h6",
    "section", "article", "hr", "pre", "blockquote",
];

/// A parsed HTML document.
///
/// Owned by a single extraction call. Malformed markup is repaired by the
/// HTML5 parser, so parsing a `&str` always succeeds.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses an HTML string.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Parses raw bytes, which must be UTF-8 (a leading BOM is ignored).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScrapeError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ScrapeError::Parse(format!("invalid UTF-8 at byte {}", e.valid_up_to()))
        })?;
        Ok(Self::parse(text))
    }

    /// The underlying parsed tree.
    #[must_use]
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Number of markup errors the parser recovered from.
    #[must_use]
    pub fn parse_error_count(&self) -> usize {
        self.html.errors.len()
    }

    /// Every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.html.root_element().descendants().filter_map(ElementRef::wrap)
    }

    /// Elements with the given (lowercase) tag name, in document order.
    pub fn elements_by_tag<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.elements().filter(move |el| el.value().name() == tag)
    }

    /// Elements with the given tag that carry `attr`, paired with its value.
    pub fn elements_with_attr<'a>(
        &'a self,
        tag: &'a str,
        attr: &'a str,
    ) -> impl Iterator<Item = (ElementRef<'a>, &'a str)> + 'a {
        self.elements_by_tag(tag)
            .filter_map(move |el| el.value().attr(attr).map(|value| (el, value)))
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("parse_errors", &self.parse_error_count())
            .finish_non_exhaustive()
    }
}

/// Whether the element is a `<table>`.
#[must_use]
pub fn is_table(element: &ElementRef<'_>) -> bool {
    element.value().name() == "table"
}

/// Flattens an element to whitespace-normalized text.
///
/// Nested tables and script-like content are left out; block elements and
/// `<br>` separate words.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    let mut stack: Vec<_> = element.children().rev().collect();

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if name == "table" || SKIPPED_TEXT.contains(&name) {
                    continue;
                }
                if BLOCK_ELEMENTS.contains(&name) {
                    out.push(' ');
                }
                stack.extend(node.children().rev());
            }
            _ => {}
        }
    }

    normalize_ws(&out)
}

/// Collapse sequences of whitespace into a single space and trim.
#[must_use]
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}
