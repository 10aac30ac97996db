// src/extract/page.rs
// =============================================================================
// Rendered pages: documents that live in a browser.
//
// A live page runs the selector inside its own execution context and hands
// back each matched element's resolved navigation target. The browser has
// already resolved relative links, so nothing here needs a base URL.
//
// Driving a browser is not our job. `PageSnapshot` is a recording of what a
// rendered page returned for a set of selectors, so the CLI and the tests can
// replay a page without one.
// =============================================================================

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[async_trait]
pub trait RenderedPage: Send + Sync {
    // Returns the resolved link target of every element matching `selector`,
    // in document order. Elements without a target yield an empty string.
    async fn eval_selector_hrefs(&self, selector: &str) -> Result<Vec<String>>;
}

// Navigation targets recorded from a rendered page, keyed by selector.
//
// JSON form:
//   { "url": "https://example.com/", "selectors": { "a": ["https://example.com/a"] } }
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// The address of the page when it was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Selector -> resolved targets
    #[serde(default)]
    pub selectors: HashMap<String, Vec<String>>,
}

impl PageSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the targets a selector produced
    pub fn with_selector(
        mut self,
        selector: impl Into<String>,
        targets: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.selectors.insert(
            selector.into(),
            targets.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[async_trait]
impl RenderedPage for PageSnapshot {
    async fn eval_selector_hrefs(&self, selector: &str) -> Result<Vec<String>> {
        // A live page would answer any selector; a recording can only answer
        // the ones it saw
        self.selectors
            .get(selector)
            .cloned()
            .ok_or_else(|| anyhow!("page snapshot has no recorded result for selector `{}`", selector))
    }
}
