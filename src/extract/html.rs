// src/extract/html.rs
// =============================================================================
// This module runs selector queries against static HTML documents.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// The document only answers "which attribute values do the matched elements
// carry?". Resolving those values into absolute URLs happens one level up,
// in extract/mod.rs, because it needs the caller's base URL.
// =============================================================================

use crate::error::ConfigError;
use anyhow::Result;
use scraper::{Html, Selector};

// A static document tree that can answer selector queries.
//
// Implementations return one entry per matched element, in document order.
// `None` means the element matched but does not carry the attribute.
pub trait ParsedDocument: Send + Sync {
    fn query_selector_attr(&self, selector: &str, attr: &str) -> Result<Vec<Option<String>>>;
}

// An HTML document parsed with scraper.
//
// scraper's `Html` tree is not thread-safe, so we keep the markup and parse
// it per query. A call runs exactly one query, so this costs nothing extra.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    html: String,
}

impl HtmlDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// The raw markup this document was created from
    pub fn html(&self) -> &str {
        &self.html
    }
}

// Parses a caller-supplied CSS selector.
//
// Unlike a hard-coded "a[href]", a bad selector here is the caller's
// mistake, so it is an error instead of a panic.
pub fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

impl ParsedDocument for HtmlDocument {
    fn query_selector_attr(&self, selector: &str, attr: &str) -> Result<Vec<Option<String>>> {
        let selector = parse_selector(selector)?;

        let document = Html::parse_document(&self.html);

        let values = document
            .select(&selector)
            .map(|element| element.value().attr(attr).map(str::to_string))
            .collect();

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_returns_attributes_in_document_order() {
        let doc = HtmlDocument::new(
            r#"
            <a href="/first">First</a>
            <a>No href</a>
            <a href="https://www.rust-lang.org">Rust</a>
        "#,
        );
        let values = doc.query_selector_attr("a", "href").unwrap();
        assert_eq!(
            values,
            vec![
                Some("/first".to_string()),
                None,
                Some("https://www.rust-lang.org".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_respects_selector() {
        let doc = HtmlDocument::new(
            r#"
            <nav><a href="/home">Home</a></nav>
            <div class="products"><a class="item" href="/p/1">One</a></div>
        "#,
        );
        let values = doc.query_selector_attr("div.products a.item", "href").unwrap();
        assert_eq!(values, vec![Some("/p/1".to_string())]);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let doc = HtmlDocument::new("<a href='/x'>x</a>");
        let err = doc.query_selector_attr("a[", "href").unwrap_err();
        assert!(err.to_string().contains("invalid CSS selector"));
    }

    #[test]
    fn test_parse_selector_reports_config_error() {
        assert!(parse_selector("div.products a.item").is_ok());
        let err = parse_selector("a[").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSelector { ref selector, .. } if selector == "a["));
    }
}
