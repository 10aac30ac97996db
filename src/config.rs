// src/config.rs
// =============================================================================
// Optional TOML configuration for enqueue runs.
//
// Long pattern lists with templates are painful on the command line, so they
// can live in a file instead:
//
//   selector = "a"
//   base_url = "https://shop.com/"
//   limit = 100
//   exclude = ["https://shop.com/logout[.*]"]
//
//   [user_data]
//   depth = 1
//
//   [[patterns]]
//   purl = "https://shop.com/products/[.*]"
//   user_data = { label = "DETAIL" }
//
// Command-line flags are applied on top (see main.rs).
// =============================================================================

use crate::enqueue::{EnqueueOptions, DEFAULT_SELECTOR};
use crate::error::ConfigError;
use crate::patterns::{PatternSpec, UrlPattern};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnqueueConfig {
    pub selector: Option<String>,
    pub base_url: Option<String>,
    pub limit: Option<usize>,
    pub keep_url_fragment: bool,
    pub forefront: bool,
    pub patterns: Vec<PatternSpec>,
    pub exclude: Vec<PatternSpec>,
    pub user_data: Map<String, Value>,
}

impl EnqueueConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse enqueue config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in config file {}", path.display()))
    }

    // Turns the file's pattern specs into real patterns and fills in defaults
    pub fn into_options(self) -> Result<EnqueueOptions, ConfigError> {
        let patterns = to_patterns(self.patterns)?;
        let exclude = to_patterns(self.exclude)?;

        Ok(EnqueueOptions {
            selector: self.selector.unwrap_or_else(|| DEFAULT_SELECTOR.to_string()),
            base_url: self.base_url,
            patterns: if patterns.is_empty() { None } else { Some(patterns) },
            exclude,
            limit: self.limit,
            user_data: self.user_data,
            keep_url_fragment: self.keep_url_fragment,
            forefront: self.forefront,
            transform: None,
        })
    }
}

fn to_patterns(specs: Vec<PatternSpec>) -> Result<Vec<UrlPattern>, ConfigError> {
    specs.into_iter().map(UrlPattern::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternKind;
    use serde_json::json;

    #[test]
    fn test_full_config() {
        let config = EnqueueConfig::from_toml_str(
            r#"
            selector = "a.item"
            base_url = "https://shop.com/"
            limit = 10
            keep_url_fragment = true
            exclude = ["https://shop.com/logout[.*]"]
            patterns = [
                "https://shop.com/blog/[.*]",
                { purl = "https://shop.com/products/[.*]", method = "POST", user_data = { label = "DETAIL" } },
                { regex = "^https://shop\\.com/c/\\d+$" },
            ]

            [user_data]
            depth = 1
        "#,
        )
        .unwrap();

        let options = config.into_options().unwrap();
        assert_eq!(options.selector, "a.item");
        assert_eq!(options.base_url.as_deref(), Some("https://shop.com/"));
        assert_eq!(options.limit, Some(10));
        assert!(options.keep_url_fragment);
        assert_eq!(options.user_data.get("depth"), Some(&json!(1)));
        assert_eq!(options.exclude.len(), 1);

        let patterns = options.patterns.unwrap();
        assert_eq!(patterns.len(), 3);
        assert!(matches!(patterns[0].kind(), PatternKind::Glob(_)));
        assert_eq!(
            patterns[1].template().unwrap().user_data.get("label"),
            Some(&json!("DETAIL"))
        );
        assert!(matches!(patterns[2].kind(), PatternKind::Regex(_)));
    }

    #[test]
    fn test_empty_config_gives_defaults() {
        let options = EnqueueConfig::from_toml_str("").unwrap().into_options().unwrap();
        assert_eq!(options.selector, "a");
        assert!(options.patterns.is_none());
        assert!(options.limit.is_none());
    }

    #[test]
    fn test_pattern_object_without_pattern_field() {
        let config = EnqueueConfig::from_toml_str(
            r#"
            [[patterns]]
            method = "POST"
        "#,
        )
        .unwrap();
        assert!(matches!(
            config.into_options(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(EnqueueConfig::from_toml_str("limit = \"ten\"").is_err());
    }
}
