//! Resource reference discovery.

use url::Url;

use super::document::Document;
use super::models::{Diagnostic, ResourceSet};

/// Whether a `rel` attribute lists the `stylesheet` token.
fn is_stylesheet_rel(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
}

/// The base used for relative references: the first `<base href>`
/// resolved against `base_url`, otherwise `base_url` itself.
fn effective_base(doc: &Document, base_url: &str) -> Result<Url, String> {
    let page = Url::parse(base_url.trim())
        .map_err(|e| format!("invalid base URL '{base_url}': {e}"));

    let Some((_, href)) = doc.elements_with_attr("base", "href").next() else {
        return page;
    };
    let href = href.trim();
    if href.is_empty() {
        return page;
    }
    if let Ok(absolute) = Url::parse(href) {
        return Ok(absolute);
    }
    match page {
        Ok(page) => Ok(page.join(href).unwrap_or(page)),
        Err(e) => Err(e),
    }
}

struct Resolver {
    base: Result<Url, String>,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver {
    fn resolve(&mut self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if Url::parse(reference).is_ok() {
            return Some(reference.to_string());
        }

        let joined = match &self.base {
            Ok(base) => base.join(reference).map_err(|e| e.to_string()),
            Err(reason) => Err(reason.clone()),
        };
        match joined {
            Ok(url) => Some(url.to_string()),
            Err(reason) => {
                self.diagnostics.push(Diagnostic::UnresolvedResource {
                    reference: reference.to_string(),
                    reason,
                });
                None
            }
        }
    }
}

/// Collects stylesheet, script and image references as absolute URLs.
///
/// Absolute references are kept verbatim. Relative ones that cannot be
/// resolved are skipped and reported.
#[must_use]
pub fn collect_resources(doc: &Document, base_url: &str) -> (ResourceSet, Vec<Diagnostic>) {
    let mut resolver = Resolver {
        base: effective_base(doc, base_url),
        diagnostics: Vec::new(),
    };
    let mut resources = ResourceSet::default();

    for element in doc.elements() {
        let el = element.value();
        match el.name() {
            "link" if el.attr("rel").is_some_and(is_stylesheet_rel) => {
                if let Some(url) = el.attr("href").and_then(|href| resolver.resolve(href)) {
                    resources.stylesheets.push(url);
                }
            }
            "script" => {
                if let Some(url) = el.attr("src").and_then(|src| resolver.resolve(src)) {
                    resources.scripts.push(url);
                }
            }
            "img" => {
                if let Some(url) = el.attr("src").and_then(|src| resolver.resolve(src)) {
                    resources.images.push(url);
                }
            }
            _ => {}
        }
    }

    (resources, resolver.diagnostics)
}
