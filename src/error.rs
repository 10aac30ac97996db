// src/error.rs
// =============================================================================
// Error types for the link-enqueuing pipeline.
//
// Two layers:
// - ConfigError: the call was set up wrong. Raised before any extraction or
//   queue I/O happens, so nothing is ever partially applied.
// - EnqueueError: everything that can stop a call once it is running
//   (unresolvable links, a failing document/page accessor, a failing queue).
//
// The collaborator traits (page, document, queue) report failures as
// anyhow::Error; we keep those as the `source` of the matching variant so
// callers can still walk the error chain.
// =============================================================================

use thiserror::Error;

/// A problem with how `enqueue_links` was configured.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Both a rendered page and a parsed document were supplied
    #[error("exactly one link source is allowed, but both a rendered page and a parsed document were supplied")]
    BothSources,

    /// Neither a rendered page nor a parsed document was supplied
    #[error("a link source is required: supply either a rendered page or a parsed document")]
    NoSource,

    /// A URL pattern could not be compiled
    #[error("invalid URL pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Limit must be a positive integer
    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(usize),

    #[error("selector must not be empty")]
    EmptySelector,

    /// The selector is not valid CSS
    #[error("invalid CSS selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The base URL itself does not parse
    #[error("invalid base URL `{value}`: {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

impl ConfigError {
    pub(crate) fn pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Everything that can make a single `enqueue_links` call fail.
#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("invalid enqueue configuration: {0}")]
    Config(#[from] ConfigError),

    /// A relative link was found in a static document but no base URL was given
    #[error("cannot resolve relative URL `{value}`: no base URL was supplied for the document")]
    UnresolvableUrl { value: String },

    /// Joining a relative link onto the base URL failed
    #[error("cannot resolve URL `{value}` against `{base}`: {source}")]
    InvalidUrl {
        value: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    /// The page or document accessor failed to run the selector
    #[error("link extraction with selector `{selector}` failed: {source}")]
    Extraction {
        selector: String,
        #[source]
        source: anyhow::Error,
    },

    /// A transform produced a request without an absolute URL
    #[error("request has no absolute URL: `{url}`")]
    InvalidRequest { url: String },

    /// The queue backend rejected a request (after its own retries)
    #[error("failed to add {url} to the request queue: {source}")]
    Queue {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_config_error_converts_into_enqueue_error() {
        let err: EnqueueError = ConfigError::InvalidLimit(0).into();
        assert!(matches!(err, EnqueueError::Config(ConfigError::InvalidLimit(0))));
        assert!(err.to_string().contains("limit must be a positive integer"));
    }

    #[test]
    fn test_queue_error_keeps_source() {
        let err = EnqueueError::Queue {
            url: "https://example.com/".to_string(),
            source: anyhow::anyhow!("storage unavailable"),
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("storage unavailable"));
    }

    #[test]
    fn test_unresolvable_url_names_the_value() {
        let err = EnqueueError::UnresolvableUrl {
            value: "/relative".to_string(),
        };
        assert!(err.to_string().contains("`/relative`"));
    }
}
