// src/patterns/pattern.rs
// =============================================================================
// URL patterns as callers write them.
//
// A pattern says "which links do I want?" and, optionally, "what should their
// requests look like?" (a RequestTemplate). Four kinds:
// - Exact:  the URL must equal the string
// - Glob:   pseudo-URL syntax, see glob.rs
// - Regex:  a regular expression that must match somewhere in the URL
// - Custom: any matcher the caller builds
//
// Config files describe patterns with PatternSpec, which accepts a plain
// string or an object: { purl = "...", user_data = { label = "X" } }.
// =============================================================================

use crate::error::ConfigError;
use crate::request::RequestTemplate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// Anything that can decide whether a URL matches
pub trait UrlMatcher: Send + Sync {
    fn matches(&self, url: &str) -> bool;
}

impl<F> UrlMatcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn matches(&self, url: &str) -> bool {
        self(url)
    }
}

#[derive(Clone)]
pub enum PatternKind {
    Exact(String),
    Glob(String),
    Regex(Regex),
    Custom(Arc<dyn UrlMatcher>),
}

impl fmt::Debug for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Exact(url) => f.debug_tuple("Exact").field(url).finish(),
            PatternKind::Glob(glob) => f.debug_tuple("Glob").field(glob).finish(),
            PatternKind::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            PatternKind::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UrlPattern {
    kind: PatternKind,
    template: Option<RequestTemplate>,
}

impl UrlPattern {
    pub fn exact(url: impl Into<String>) -> Self {
        Self::from_kind(PatternKind::Exact(url.into()))
    }

    pub fn glob(glob: impl Into<String>) -> Self {
        Self::from_kind(PatternKind::Glob(glob.into()))
    }

    pub fn regex(regex: Regex) -> Self {
        Self::from_kind(PatternKind::Regex(regex))
    }

    pub fn custom(matcher: impl UrlMatcher + 'static) -> Self {
        Self::from_kind(PatternKind::Custom(Arc::new(matcher)))
    }

    // Shorthand for strings: anything with a `[` is a glob, the rest are
    // exact URLs
    pub fn parse(pattern: &str) -> Self {
        if pattern.contains('[') {
            Self::glob(pattern)
        } else {
            Self::exact(pattern)
        }
    }

    fn from_kind(kind: PatternKind) -> Self {
        Self { kind, template: None }
    }

    /// Attaches a template merged into every request this pattern matches
    pub fn with_template(mut self, template: RequestTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    pub fn template(&self) -> Option<&RequestTemplate> {
        self.template.as_ref()
    }

    // A short human-readable form for logs and CLI output
    pub fn describe(&self) -> String {
        match &self.kind {
            PatternKind::Exact(url) => url.clone(),
            PatternKind::Glob(glob) => glob.clone(),
            PatternKind::Regex(re) => format!("/{}/", re.as_str()),
            PatternKind::Custom(_) => "<custom matcher>".to_string(),
        }
    }
}

impl From<&str> for UrlPattern {
    fn from(pattern: &str) -> Self {
        UrlPattern::parse(pattern)
    }
}

impl From<String> for UrlPattern {
    fn from(pattern: String) -> Self {
        UrlPattern::parse(&pattern)
    }
}

impl From<Regex> for UrlPattern {
    fn from(regex: Regex) -> Self {
        UrlPattern::regex(regex)
    }
}

// How a pattern is written in a config file.
//
// TOML examples:
//   patterns = ["https://example.com/blog/[.*]"]
//
//   [[patterns]]
//   purl = "https://example.com/products/[.*]"
//   user_data = { label = "DETAIL" }
//
//   [[patterns]]
//   regex = "^https://example\\.com/c/\\d+$"
//   method = "POST"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Shorthand(String),
    Object(PatternObject),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(flatten)]
    pub template: RequestTemplate,
}

impl TryFrom<PatternSpec> for UrlPattern {
    type Error = ConfigError;

    fn try_from(spec: PatternSpec) -> Result<Self, Self::Error> {
        let object = match spec {
            PatternSpec::Shorthand(pattern) => return Ok(UrlPattern::parse(&pattern)),
            PatternSpec::Object(object) => object,
        };

        let pattern = match (object.purl, object.regex) {
            (Some(purl), None) => UrlPattern::parse(&purl),
            (None, Some(source)) => {
                let regex = Regex::new(&source)
                    .map_err(|e| ConfigError::pattern(source.as_str(), e.to_string()))?;
                UrlPattern::regex(regex)
            }
            (Some(purl), Some(_)) => {
                return Err(ConfigError::pattern(purl, "set either `purl` or `regex`, not both"))
            }
            (None, None) => {
                return Err(ConfigError::pattern(
                    "<object>",
                    "pattern object needs a `purl` or `regex` field",
                ))
            }
        };

        if object.template.is_empty() {
            Ok(pattern)
        } else {
            Ok(pattern.with_template(object.template))
        }
    }
}
