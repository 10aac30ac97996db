// src/extract/mod.rs
// =============================================================================
// This module pulls link targets out of a page or a document.
//
// Submodules:
// - html: static documents parsed with scraper
// - page: rendered pages (a live DOM, or a recording of one)
//
// The two sources differ in who resolves relative links:
// - A rendered page resolves them itself (the browser knows where it is)
// - A static document only has raw attribute values, so we resolve them
//   against the caller's base URL, and fail loudly when there is none
// =============================================================================

mod html;
mod page;

pub use html::{parse_selector, HtmlDocument, ParsedDocument};
pub use page::{PageSnapshot, RenderedPage};

use crate::error::{ConfigError, EnqueueError};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

// The attribute we read link targets from in static documents
const LINK_ATTRIBUTE: &str = "href";

// Where links come from: exactly one of a rendered page or a parsed document
#[derive(Clone, Copy)]
pub enum LinkSource<'a> {
    Page(&'a dyn RenderedPage),
    Document(&'a dyn ParsedDocument),
}

impl<'a> LinkSource<'a> {
    // Builds a source from two optional handles.
    //
    // Callers that collect their inputs loosely (a CLI, a config file) end up
    // with two optionals; this is where "both" and "neither" get rejected.
    pub fn from_parts(
        page: Option<&'a dyn RenderedPage>,
        document: Option<&'a dyn ParsedDocument>,
    ) -> Result<Self, ConfigError> {
        match (page, document) {
            (Some(page), None) => Ok(LinkSource::Page(page)),
            (None, Some(document)) => Ok(LinkSource::Document(document)),
            (Some(_), Some(_)) => Err(ConfigError::BothSources),
            (None, None) => Err(ConfigError::NoSource),
        }
    }

    pub fn is_page(&self) -> bool {
        matches!(self, LinkSource::Page(_))
    }
}

impl std::fmt::Debug for LinkSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkSource::Page(_) => f.write_str("LinkSource::Page"),
            LinkSource::Document(_) => f.write_str("LinkSource::Document"),
        }
    }
}

// Extracts absolute link targets from a source, in document order.
//
// Parameters:
//   source: the page or document to query
//   selector: which elements to read links from (e.g. "a", "a.next")
//   base_url: used to resolve relative links in documents; pages ignore it
//
// Returns: Vec of absolute URLs. Empty and missing values are skipped.
pub async fn extract_urls(
    source: LinkSource<'_>,
    selector: &str,
    base_url: Option<&Url>,
) -> Result<Vec<String>, EnqueueError> {
    let urls = match source {
        LinkSource::Page(page) => {
            let targets = page
                .eval_selector_hrefs(selector)
                .await
                .map_err(|source| EnqueueError::Extraction {
                    selector: selector.to_string(),
                    source,
                })?;

            targets
                .into_iter()
                .map(|target| target.trim().to_string())
                .filter(|target| !target.is_empty())
                .collect()
        }
        LinkSource::Document(document) => {
            let values = document
                .query_selector_attr(selector, LINK_ATTRIBUTE)
                .map_err(|source| EnqueueError::Extraction {
                    selector: selector.to_string(),
                    source,
                })?;

            let mut urls = Vec::with_capacity(values.len());
            for value in values.into_iter().flatten() {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                urls.push(resolve_url(value, base_url)?);
            }
            urls
        }
    };

    debug!(count = urls.len(), selector, "extracted link targets");
    Ok(urls)
}

// Checks whether a value starts with a URI scheme ("https:", "mailto:", ...)
//
// scheme = letter *( letter / digit / "+" / "-" / "." ), followed by ":"
pub fn has_scheme(value: &str) -> bool {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("scheme pattern is valid"))
        .is_match(value)
}

// Resolves one attribute value into an absolute URL
//
// Examples (base = "https://example.com/docs/page"):
//   "https://other.com/x" -> "https://other.com/x" (kept exactly as written)
//   "/about"              -> "https://example.com/about"
//   "../up"               -> "https://example.com/up"
//   "//cdn.example.com/a" -> "https://cdn.example.com/a"
//   "?page=2"             -> "https://example.com/docs/page?page=2"
fn resolve_url(value: &str, base_url: Option<&Url>) -> Result<String, EnqueueError> {
    if has_scheme(value) {
        return Ok(value.to_string());
    }

    // Relative links need a base
    let base = base_url.ok_or_else(|| EnqueueError::UnresolvableUrl {
        value: value.to_string(),
    })?;

    base.join(value)
        .map(String::from)
        .map_err(|source| EnqueueError::InvalidUrl {
            value: value.to_string(),
            base: base.to_string(),
            source,
        })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `&'a dyn RenderedPage` instead of a generic?
//    - LinkSource only borrows the page or document for one call
//    - A trait object lets one enum hold either kind without generics
//      leaking into every function signature
//
// 2. What does .flatten() do on Vec<Option<String>>?
//    - Option is iterable (zero or one item)
//    - flatten() skips the Nones and unwraps the Somes
//    - Here that drops elements that have no href at all
//
// 3. Why is the scheme regex in a OnceLock?
//    - Compiling a regex is expensive compared to matching with it
//    - OnceLock compiles it the first time it's needed, then reuses it
// -----------------------------------------------------------------------------
