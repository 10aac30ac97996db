// src/enqueue.rs
// =============================================================================
// The public entry point: enqueue_links.
//
// What happens in one call:
// 1. Validate the options (nothing is extracted or enqueued if this fails)
// 2. Extract link targets from the page or document
// 3. Drop excluded links, then match the rest against the patterns
// 4. Build requests (templates, transform, limit)
// 5. Submit them to the queue in batches
//
// Data flows straight through, one pass. The only concurrency is in step 5.
// =============================================================================

use crate::error::{ConfigError, EnqueueError};
use crate::extract::{extract_urls, parse_selector, LinkSource};
use crate::patterns::{MatchOutcome, PatternSet, UrlPattern};
use crate::queue::{submit_in_batches, AddRequestOptions, QueueOperationInfo, RequestQueue};
use crate::request::{build_requests, BuildOptions, RequestTemplate, TransformRequest};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// The selector used when none is given
pub const DEFAULT_SELECTOR: &str = "a";

// Everything enqueue_links can be told.
//
// Example:
//   let options = EnqueueOptions::new()
//       .with_base_url("https://example.com/")
//       .with_pattern("https://example.com/products/[.*]")
//       .with_limit(20);
#[derive(Clone)]
pub struct EnqueueOptions {
    /// CSS selector for the elements to read links from
    pub selector: String,
    /// Resolves relative links in static documents (ignored for pages)
    pub base_url: Option<String>,
    /// Only links matching one of these are enqueued; None or empty = all
    pub patterns: Option<Vec<UrlPattern>>,
    /// Links matching any of these are never enqueued
    pub exclude: Vec<UrlPattern>,
    /// Enqueue at most this many requests
    pub limit: Option<usize>,
    /// User data every request starts with
    pub user_data: Map<String, Value>,
    pub keep_url_fragment: bool,
    /// Put the new requests at the head of the queue
    pub forefront: bool,
    pub transform: Option<Arc<dyn TransformRequest>>,
}

impl Default for EnqueueOptions {
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            base_url: None,
            patterns: None,
            exclude: Vec::new(),
            limit: None,
            user_data: Map::new(),
            keep_url_fragment: false,
            forefront: false,
            transform: None,
        }
    }
}

impl fmt::Debug for EnqueueOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnqueueOptions")
            .field("selector", &self.selector)
            .field("base_url", &self.base_url)
            .field("patterns", &self.patterns)
            .field("exclude", &self.exclude)
            .field("limit", &self.limit)
            .field("user_data", &self.user_data)
            .field("keep_url_fragment", &self.keep_url_fragment)
            .field("forefront", &self.forefront)
            .field("transform", &self.transform.as_ref().map(|_| ".."))
            .finish()
    }
}

impl EnqueueOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Adds one include pattern
    pub fn with_pattern(mut self, pattern: impl Into<UrlPattern>) -> Self {
        self.patterns.get_or_insert_with(Vec::new).push(pattern.into());
        self
    }

    pub fn with_patterns<P: Into<UrlPattern>>(mut self, patterns: impl IntoIterator<Item = P>) -> Self {
        self.patterns
            .get_or_insert_with(Vec::new)
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_exclude(mut self, pattern: impl Into<UrlPattern>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_user_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user_data.insert(key.into(), value.into());
        self
    }

    pub fn with_keep_url_fragment(mut self, keep: bool) -> Self {
        self.keep_url_fragment = keep;
        self
    }

    pub fn with_forefront(mut self, forefront: bool) -> Self {
        self.forefront = forefront;
        self
    }

    pub fn with_transform(mut self, transform: impl TransformRequest + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    // Checks every option once and compiles the patterns.
    //
    // Document sources also get their selector and base URL checked here.
    // Pages evaluate the selector themselves and never use the base URL, so
    // neither is looked at for them.
    //
    // Returns the first problem found; nothing else runs if this fails.
    pub fn validate(&self, source: LinkSource<'_>) -> Result<ValidatedOptions, ConfigError> {
        if self.selector.trim().is_empty() {
            return Err(ConfigError::EmptySelector);
        }

        if let Some(0) = self.limit {
            return Err(ConfigError::InvalidLimit(0));
        }

        let base_url = match source {
            LinkSource::Page(_) => None,
            LinkSource::Document(_) => {
                parse_selector(&self.selector)?;
                self.base_url
                    .as_deref()
                    .map(|value| {
                        Url::parse(value).map_err(|source| ConfigError::InvalidBaseUrl {
                            value: value.to_string(),
                            source,
                        })
                    })
                    .transpose()?
            }
        };

        let patterns = PatternSet::compile(self.patterns.iter().flatten())?;
        let exclude = PatternSet::compile(&self.exclude)?;

        Ok(ValidatedOptions {
            base_url,
            patterns,
            exclude,
        })
    }
}

/// Options that passed validation, with patterns compiled
pub struct ValidatedOptions {
    // Only set for document sources
    base_url: Option<Url>,
    patterns: PatternSet,
    exclude: PatternSet,
}

impl ValidatedOptions {
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn exclude(&self) -> &PatternSet {
        &self.exclude
    }

    // Decides whether a link is wanted and which template applies.
    //
    // Returns None for excluded links and links no pattern matched.
    pub fn route<'a>(&'a self, url: &str) -> Option<Option<&'a RequestTemplate>> {
        if let Some(matcher) = self.exclude.first_match(url) {
            debug!(%url, pattern = matcher.source(), "link excluded");
            return None;
        }

        match self.patterns.classify(url) {
            MatchOutcome::PassThrough => Some(None),
            MatchOutcome::Matched(matcher) => {
                debug!(%url, pattern = matcher.source(), "link matched");
                Some(matcher.template())
            }
            MatchOutcome::NoMatch => {
                debug!(%url, "link matched no pattern");
                None
            }
        }
    }
}

// Extracts links from a page or document and adds the wanted ones to a queue.
//
// Returns one QueueOperationInfo per enqueued request, in the order the
// links appeared (after filtering, transform and limit).
pub async fn enqueue_links(
    source: LinkSource<'_>,
    queue: &dyn RequestQueue,
    options: &EnqueueOptions,
) -> Result<Vec<QueueOperationInfo>, EnqueueError> {
    let validated = options.validate(source)?;

    if source.is_page() {
        if let Some(base) = options.base_url.as_deref() {
            warn!(base_url = %base, "base URL ignored: rendered pages resolve links themselves");
        }
    }

    let urls = extract_urls(source, &options.selector, validated.base_url()).await?;
    let extracted = urls.len();

    let candidates = urls
        .into_iter()
        .filter_map(|url| validated.route(&url).map(|template| (url, template)));

    let requests = build_requests(
        candidates,
        BuildOptions {
            keep_url_fragment: options.keep_url_fragment,
            user_data: &options.user_data,
            transform: options.transform.as_deref(),
            limit: options.limit,
        },
    )?;

    let outcomes = submit_in_batches(
        queue,
        requests,
        AddRequestOptions {
            forefront: options.forefront,
        },
    )
    .await?;

    let added = outcomes.iter().filter(|info| !info.was_already_present).count();
    info!(
        extracted,
        enqueued = outcomes.len(),
        added,
        duplicates = outcomes.len() - added,
        "enqueued links"
    );

    Ok(outcomes)
}
