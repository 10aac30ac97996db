// src/queue/memory.rs
// =============================================================================
// An in-process request queue with deduplication.
//
// How it works:
// - Every request gets an id derived from its unique key
// - Adding a request whose id is already known changes nothing and reports
//   "already present" (and whether it was already handled)
// - New requests go to the back of a FIFO, or the front with `forefront`
// - A consumer pops requests with fetch_next_request and reports them done
//   with mark_request_handled
//
// Rust concepts:
// - HashMap: id -> stored request, O(1) dedup lookups
// - VecDeque: double-ended queue, so forefront requests can jump the line
// - tokio::sync::Mutex: async-aware lock shared by concurrent adds
// =============================================================================

use super::{AddRequestOptions, QueueOperationInfo, RequestQueue};
use crate::request::RequestDescriptor;
use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;
use tracing::trace;

// Length of generated request ids
const REQUEST_ID_LENGTH: usize = 15;

// Derives a stable request id from a unique key.
//
// SHA-256 of the key, base64-encoded, with `+`, `/` and `=` removed,
// cut to 15 characters. The same key always gets the same id.
pub fn request_id_for(unique_key: &str) -> String {
    let digest = Sha256::digest(unique_key.as_bytes());
    STANDARD
        .encode(digest)
        .chars()
        .filter(|c| !matches!(c, '+' | '/' | '='))
        .take(REQUEST_ID_LENGTH)
        .collect()
}

/// A request handed out by `fetch_next_request`
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedRequest {
    pub id: String,
    pub request: RequestDescriptor,
}

#[derive(Debug)]
struct StoredRequest {
    request: RequestDescriptor,
    handled: bool,
}

#[derive(Debug, Default)]
struct QueueState {
    // Every request ever added, by id
    requests: HashMap<String, StoredRequest>,
    // Ids waiting to be fetched
    pending: VecDeque<String>,
    handled_count: usize,
}

#[derive(Debug, Default)]
pub struct MemoryRequestQueue {
    state: Mutex<QueueState>,
}

impl MemoryRequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // Takes the next pending request off the queue.
    //
    // The request stays known (so re-adding it is still a duplicate) until
    // the end of the queue's life.
    pub async fn fetch_next_request(&self) -> Option<QueuedRequest> {
        let mut state = self.state.lock().await;
        let id = state.pending.pop_front()?;
        let request = state.requests.get(&id)?.request.clone();
        Some(QueuedRequest { id, request })
    }

    // Marks a request as processed. Returns None for unknown ids.
    pub async fn mark_request_handled(&self, id: &str) -> Option<QueueOperationInfo> {
        let mut state = self.state.lock().await;
        let stored = state.requests.get_mut(id)?;
        let was_already_handled = stored.handled;
        stored.handled = true;
        let unique_key = stored.request.unique_key.clone();

        if !was_already_handled {
            state.handled_count += 1;
        }

        Some(QueueOperationInfo {
            request_id: id.to_string(),
            was_already_present: true,
            was_already_handled,
            unique_key,
        })
    }

    /// Requests waiting to be fetched
    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    pub async fn handled_count(&self) -> usize {
        self.state.lock().await.handled_count
    }

    /// Every distinct request ever added
    pub async fn total_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending_count().await == 0
    }
}

#[async_trait]
impl RequestQueue for MemoryRequestQueue {
    async fn add_request(
        &self,
        request: RequestDescriptor,
        options: AddRequestOptions,
    ) -> Result<QueueOperationInfo> {
        let id = request_id_for(&request.unique_key);
        let unique_key = request.unique_key.clone();
        let mut state = self.state.lock().await;

        // Skip if already known
        if let Some(stored) = state.requests.get(&id) {
            trace!(%unique_key, "request already present");
            return Ok(QueueOperationInfo {
                request_id: id,
                was_already_present: true,
                was_already_handled: stored.handled,
                unique_key,
            });
        }

        state.requests.insert(
            id.clone(),
            StoredRequest {
                request,
                handled: false,
            },
        );
        if options.forefront {
            state.pending.push_front(id.clone());
        } else {
            state.pending.push_back(id.clone());
        }
        trace!(%unique_key, forefront = options.forefront, "request added");

        Ok(QueueOperationInfo {
            request_id: id,
            was_already_present: false,
            was_already_handled: false,
            unique_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn add(queue: &MemoryRequestQueue, url: &str, forefront: bool) -> QueueOperationInfo {
        queue
            .add_request(RequestDescriptor::new(url), AddRequestOptions { forefront })
            .await
            .unwrap()
    }

    #[test]
    fn test_request_id_is_stable_and_short() {
        let a = request_id_for("https://example.com/a");
        assert_eq!(a, request_id_for("https://example.com/a"));
        assert_ne!(a, request_id_for("https://example.com/b"));
        assert_eq!(a.len(), 15);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_duplicate_unique_key_is_reported() {
        let queue = MemoryRequestQueue::new();
        let first = add(&queue, "https://example.com/a", false).await;
        // Same unique key once the fragment is stripped
        let second = add(&queue, "https://example.com/a#section", false).await;

        assert!(!first.was_already_present);
        assert!(second.was_already_present);
        assert!(!second.was_already_handled);
        assert_eq!(first.request_id, second.request_id);
        assert_eq!(queue.total_count().await, 1);
    }

    #[tokio::test]
    async fn test_fifo_order_with_forefront() {
        let queue = MemoryRequestQueue::new();
        add(&queue, "https://example.com/1", false).await;
        add(&queue, "https://example.com/2", false).await;
        add(&queue, "https://example.com/urgent", true).await;

        let mut order = Vec::new();
        while let Some(next) = queue.fetch_next_request().await {
            order.push(next.request.url);
        }
        assert_eq!(
            order,
            vec!["https://example.com/urgent", "https://example.com/1", "https://example.com/2"]
        );
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_handled_requests_stay_known() {
        let queue = MemoryRequestQueue::new();
        add(&queue, "https://example.com/a", false).await;

        let next = queue.fetch_next_request().await.unwrap();
        let handled = queue.mark_request_handled(&next.id).await.unwrap();
        assert!(!handled.was_already_handled);
        assert_eq!(queue.handled_count().await, 1);

        let again = add(&queue, "https://example.com/a", false).await;
        assert!(again.was_already_present);
        assert!(again.was_already_handled);
        assert_eq!(queue.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_mark_unknown_request() {
        let queue = MemoryRequestQueue::new();
        assert!(queue.mark_request_handled("nope").await.is_none());
    }
}
