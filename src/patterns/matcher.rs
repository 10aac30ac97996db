// src/patterns/matcher.rs
// =============================================================================
// Compiled patterns and the matching policy.
//
// Patterns are compiled once per enqueue call into a PatternSet. Matching is:
// - empty set        -> every URL passes, no template
// - first match wins -> its template is used, later patterns are not asked
// - no match         -> the URL is dropped (quietly, it's not an error)
// =============================================================================

use super::glob::glob_to_regex;
use super::pattern::{PatternKind, UrlMatcher, UrlPattern};
use crate::error::ConfigError;
use crate::request::RequestTemplate;
use regex::Regex;
use std::sync::Arc;

enum MatchTest {
    Exact(String),
    Regex(Regex),
    Custom(Arc<dyn UrlMatcher>),
}

pub struct CompiledMatcher {
    test: MatchTest,
    template: Option<RequestTemplate>,
    source: String,
}

impl CompiledMatcher {
    pub fn compile(pattern: &UrlPattern) -> Result<Self, ConfigError> {
        let test = match pattern.kind() {
            PatternKind::Exact(url) => {
                if url.trim().is_empty() {
                    return Err(ConfigError::pattern(url.as_str(), "pattern is empty"));
                }
                MatchTest::Exact(url.clone())
            }
            PatternKind::Glob(glob) => MatchTest::Regex(glob_to_regex(glob)?),
            PatternKind::Regex(regex) => MatchTest::Regex(regex.clone()),
            PatternKind::Custom(matcher) => MatchTest::Custom(Arc::clone(matcher)),
        };

        Ok(Self {
            test,
            template: pattern.template().cloned(),
            source: pattern.describe(),
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        match &self.test {
            MatchTest::Exact(expected) => url == expected,
            MatchTest::Regex(regex) => regex.is_match(url),
            MatchTest::Custom(matcher) => matcher.matches(url),
        }
    }

    pub fn template(&self) -> Option<&RequestTemplate> {
        self.template.as_ref()
    }

    /// The pattern this matcher was compiled from, as written
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// What the pattern set decided about one URL
pub enum MatchOutcome<'a> {
    /// No patterns were configured, so nothing is filtered
    PassThrough,
    Matched(&'a CompiledMatcher),
    NoMatch,
}

#[derive(Default)]
pub struct PatternSet {
    matchers: Vec<CompiledMatcher>,
}

impl PatternSet {
    // Compiles patterns in order; the first bad one fails the whole set
    pub fn compile<'p>(patterns: impl IntoIterator<Item = &'p UrlPattern>) -> Result<Self, ConfigError> {
        let matchers = patterns
            .into_iter()
            .map(CompiledMatcher::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn first_match(&self, url: &str) -> Option<&CompiledMatcher> {
        self.matchers.iter().find(|matcher| matcher.matches(url))
    }

    pub fn classify(&self, url: &str) -> MatchOutcome<'_> {
        if self.is_empty() {
            return MatchOutcome::PassThrough;
        }
        match self.first_match(url) {
            Some(matcher) => MatchOutcome::Matched(matcher),
            None => MatchOutcome::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(label: &str) -> RequestTemplate {
        RequestTemplate::new().with_user_data("label", label)
    }

    #[test]
    fn test_empty_set_passes_everything() {
        let set = PatternSet::compile(Vec::<UrlPattern>::new().iter()).unwrap();
        assert!(matches!(set.classify("https://anything.org/"), MatchOutcome::PassThrough));
    }

    #[test]
    fn test_exact_pattern() {
        let patterns = [UrlPattern::exact("https://x.com/a")];
        let set = PatternSet::compile(&patterns).unwrap();
        assert!(matches!(set.classify("https://x.com/a"), MatchOutcome::Matched(_)));
        assert!(matches!(set.classify("https://x.com/a/"), MatchOutcome::NoMatch));
        assert!(matches!(set.classify("https://x.com/b"), MatchOutcome::NoMatch));
    }

    #[test]
    fn test_padded_glob_still_matches() {
        let patterns = [UrlPattern::glob(" https://x.com/[.*] ")];
        let set = PatternSet::compile(&patterns).unwrap();
        assert!(set.first_match("https://x.com/a").is_some());
    }

    #[test]
    fn test_regex_pattern_searches() {
        let patterns = [UrlPattern::regex(Regex::new(r"/item/\d+").unwrap())];
        let set = PatternSet::compile(&patterns).unwrap();
        assert!(set.first_match("https://shop.com/item/12?ref=home").is_some());
        assert!(set.first_match("https://shop.com/items").is_none());
    }

    #[test]
    fn test_custom_matcher() {
        let patterns = [UrlPattern::custom(|url: &str| url.ends_with(".pdf"))];
        let set = PatternSet::compile(&patterns).unwrap();
        assert!(set.first_match("https://x.com/report.pdf").is_some());
        assert!(set.first_match("https://x.com/report.html").is_none());
    }

    #[test]
    fn test_first_match_wins_for_template() {
        let patterns = [
            UrlPattern::glob("https://x.com/products/[.*]").with_template(template("DETAIL")),
            UrlPattern::glob("https://x.com/[.*]").with_template(template("OTHER")),
        ];
        let set = PatternSet::compile(&patterns).unwrap();

        let detail = set.first_match("https://x.com/products/1").unwrap();
        assert_eq!(detail.template().unwrap().user_data.get("label"), Some(&json!("DETAIL")));
        assert_eq!(detail.source(), "https://x.com/products/[.*]");

        let other = set.first_match("https://x.com/about").unwrap();
        assert_eq!(other.template().unwrap().user_data.get("label"), Some(&json!("OTHER")));
    }

    #[test]
    fn test_invalid_pattern_fails_compilation() {
        let patterns = [UrlPattern::exact("https://x.com/a"), UrlPattern::glob("https://x.com/[.*")];
        assert!(PatternSet::compile(&patterns).is_err());
        assert!(PatternSet::compile(&[UrlPattern::exact("")]).is_err());
    }
}
