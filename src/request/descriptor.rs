// src/request/descriptor.rs
// =============================================================================
// The request descriptor: everything the queue needs to schedule one fetch.
//
// The interesting part is the unique key. Two links that point at the same
// resource should dedupe in the queue, so the key is a normalized form of the
// URL rather than the URL itself:
//   https://Example.com/docs/?utm_source=x&b=2&a=1#intro
//   -> https://example.com/docs?a=1&b=2
// =============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// HTTP method of a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        };
        f.write_str(name)
    }
}

// One request headed for the queue.
//
// Built from an extracted link, possibly reshaped by a pattern's template and
// by the caller's transform, then handed to the queue as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Absolute URL to fetch
    pub url: String,
    /// HTTP method (GET unless a template or transform says otherwise)
    #[serde(default)]
    pub method: Method,
    /// Deduplication key; normally derived from the URL
    pub unique_key: String,
    /// Free-form data carried along to whoever handles the request
    #[serde(default)]
    pub user_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Whether the URL fragment (#...) takes part in the unique key
    #[serde(default)]
    pub keep_url_fragment: bool,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let unique_key = derive_unique_key(&url, false);
        Self {
            url,
            method: Method::Get,
            unique_key,
            user_data: Map::new(),
            headers: BTreeMap::new(),
            payload: None,
            keep_url_fragment: false,
        }
    }

    // Switches fragment handling and re-derives the unique key to match
    pub fn with_keep_url_fragment(mut self, keep: bool) -> Self {
        self.keep_url_fragment = keep;
        self.unique_key = self.derived_unique_key();
        self
    }

    /// The key this descriptor's URL would get if nobody overrode it
    pub fn derived_unique_key(&self) -> String {
        derive_unique_key(&self.url, self.keep_url_fragment)
    }
}

// The default unique key for a URL: its normalized form, or the trimmed URL
// when it doesn't parse
pub fn derive_unique_key(url: &str, keep_fragment: bool) -> String {
    normalize_url(url, keep_fragment).unwrap_or_else(|| url.trim().to_string())
}

// Normalizes a URL for deduplication.
//
// - scheme and host are lower-cased
// - `utm_*` tracking parameters are removed
// - remaining query parameters are sorted by name (stable for repeats)
// - one trailing slash is removed from the path
// - the fragment is dropped unless `keep_fragment` is set
//
// Returns None if the URL cannot be parsed.
pub fn normalize_url(url: &str, keep_fragment: bool) -> Option<String> {
    let mut parsed = Url::parse(url.trim()).ok()?;

    // mailto:, data: and friends have no host or path segments to normalize
    if parsed.cannot_be_a_base() {
        if !keep_fragment {
            parsed.set_fragment(None);
        }
        return Some(parsed.to_string());
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(name, _)| !name.starts_with("utm_"))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));

    let mut normalized = format!("{}://", parsed.scheme().to_lowercase());
    if let Some(host) = parsed.host_str() {
        normalized.push_str(&host.to_lowercase());
    }
    if let Some(port) = parsed.port() {
        normalized.push_str(&format!(":{}", port));
    }

    let path = parsed.path();
    normalized.push_str(path.strip_suffix('/').unwrap_or(path));

    if !params.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        normalized.push('?');
        normalized.push_str(&query);
    }

    if keep_fragment {
        if let Some(fragment) = parsed.fragment() {
            normalized.push('#');
            normalized.push_str(fragment);
        }
    }

    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_descriptor_defaults() {
        let request = RequestDescriptor::new("https://example.com/page");
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.unique_key, "https://example.com/page");
        assert!(request.user_data.is_empty());
        assert!(request.payload.is_none());
        assert!(!request.keep_url_fragment);
    }

    #[test]
    fn test_normalize_strips_tracking_and_sorts_query() {
        let key = normalize_url("https://Example.COM/docs/?utm_source=news&b=2&a=1#intro", false);
        assert_eq!(key.as_deref(), Some("https://example.com/docs?a=1&b=2"));
    }

    #[test]
    fn test_normalize_keeps_fragment_when_asked() {
        let key = normalize_url("https://example.com/docs#intro", true);
        assert_eq!(key.as_deref(), Some("https://example.com/docs#intro"));
    }

    #[test]
    fn test_normalize_root_and_port() {
        assert_eq!(normalize_url("https://x.com/", false).as_deref(), Some("https://x.com"));
        assert_eq!(
            normalize_url("http://x.com:8080/a/", false).as_deref(),
            Some("http://x.com:8080/a")
        );
        // Default ports disappear during parsing
        assert_eq!(normalize_url("https://x.com:443/a", false).as_deref(), Some("https://x.com/a"));
    }

    #[test]
    fn test_normalize_opaque_urls() {
        assert_eq!(
            normalize_url("mailto:team@example.com", false).as_deref(),
            Some("mailto:team@example.com")
        );
    }

    #[test]
    fn test_unparseable_url_falls_back_to_trimmed_text() {
        assert_eq!(normalize_url("not a url", false), None);
        assert_eq!(derive_unique_key("  not a url ", false), "not a url");
    }

    #[test]
    fn test_keep_fragment_rederives_key() {
        let request = RequestDescriptor::new("https://example.com/a#b");
        assert_eq!(request.unique_key, "https://example.com/a");
        let request = request.with_keep_url_fragment(true);
        assert_eq!(request.unique_key, "https://example.com/a#b");
    }

    #[test]
    fn test_method_serializes_upper_case() {
        let json = serde_json::to_string(&Method::Post).unwrap();
        assert_eq!(json, "\"POST\"");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
