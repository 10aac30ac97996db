// src/request/template.rs
// =============================================================================
// Request templates: partial descriptors attached to URL patterns.
//
// When a link matches a pattern that carries a template, the template's
// fields are merged into the link's request. That's how a crawler says
// "everything under /products/ is a DETAIL page" without writing a transform.
// =============================================================================

use super::descriptor::{Method, RequestDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    /// Added to (and override) the request's headers
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Added to (and override) the request's user data
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub user_data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_url_fragment: Option<bool>,
}

impl RequestTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_user_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user_data.insert(key.into(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_keep_url_fragment(mut self, keep: bool) -> Self {
        self.keep_url_fragment = Some(keep);
        self
    }

    /// True when merging this template would change nothing
    pub fn is_empty(&self) -> bool {
        self.method.is_none()
            && self.headers.is_empty()
            && self.user_data.is_empty()
            && self.payload.is_none()
            && self.keep_url_fragment.is_none()
    }

    // Merges the template into a request. The URL is never touched.
    pub fn apply_to(&self, request: &mut RequestDescriptor) {
        if let Some(method) = self.method {
            request.method = method;
        }
        for (name, value) in &self.headers {
            request.headers.insert(name.clone(), value.clone());
        }
        for (key, value) in &self.user_data {
            request.user_data.insert(key.clone(), value.clone());
        }
        if let Some(payload) = &self.payload {
            request.payload = Some(payload.clone());
        }
        if let Some(keep) = self.keep_url_fragment {
            request.keep_url_fragment = keep;
            request.unique_key = request.derived_unique_key();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_apply_overrides_and_extends() {
        let mut request = RequestDescriptor::new("https://example.com/p/1");
        request.user_data.insert("depth".to_string(), json!(1));
        request.user_data.insert("label".to_string(), json!("LIST"));

        RequestTemplate::new()
            .with_method(Method::Post)
            .with_header("accept", "text/html")
            .with_user_data("label", "DETAIL")
            .with_payload("id=1")
            .apply_to(&mut request);

        assert_eq!(request.url, "https://example.com/p/1");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.headers.get("accept").map(String::as_str), Some("text/html"));
        assert_eq!(request.user_data.get("label"), Some(&json!("DETAIL")));
        assert_eq!(request.user_data.get("depth"), Some(&json!(1)));
        assert_eq!(request.payload.as_deref(), Some("id=1"));
    }

    #[test]
    fn test_keep_fragment_template_updates_unique_key() {
        let mut request = RequestDescriptor::new("https://example.com/app#/route");
        RequestTemplate::new()
            .with_keep_url_fragment(true)
            .apply_to(&mut request);
        assert_eq!(request.unique_key, "https://example.com/app#/route");
    }

    #[test]
    fn test_empty_template() {
        assert!(RequestTemplate::new().is_empty());
        assert!(!RequestTemplate::new().with_user_data("label", "X").is_empty());
    }

    #[test]
    fn test_template_from_json() {
        let template: RequestTemplate =
            serde_json::from_value(json!({ "method": "POST", "user_data": { "label": "DETAIL" } }))
                .unwrap();
        assert_eq!(template.method, Some(Method::Post));
        assert_eq!(template.user_data.get("label"), Some(&json!("DETAIL")));
    }
}
