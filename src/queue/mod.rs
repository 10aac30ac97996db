// src/queue/mod.rs
// =============================================================================
// This module talks to the request queue.
//
// Submodules:
// - batch: submits requests in bounded concurrent batches
// - memory: an in-process queue with unique-key deduplication
//
// The queue itself (storage, dedup, retries) belongs to whoever implements
// RequestQueue. We only decide how many requests are in flight at once and
// keep the outcomes in the order the requests came in.
// =============================================================================

mod batch;
mod memory;

pub use batch::{submit_in_batches, BATCH_SIZE};
pub use memory::{request_id_for, MemoryRequestQueue, QueuedRequest};

use crate::request::RequestDescriptor;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Per-item result of adding a request to the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueOperationInfo {
    /// The queue's id for the request
    pub request_id: String,
    /// A request with the same unique key was already in the queue
    pub was_already_present: bool,
    /// ...and it has already been processed
    pub was_already_handled: bool,
    pub unique_key: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddRequestOptions {
    /// Put the request at the head of the queue instead of the tail
    pub forefront: bool,
}

// A persistent, deduplicating request queue.
//
// Implementations must be safe to call concurrently and should treat adds as
// idempotent per unique key. Any retrying happens in here; an error returned
// from add_request is final.
#[async_trait]
pub trait RequestQueue: Send + Sync {
    async fn add_request(
        &self,
        request: RequestDescriptor,
        options: AddRequestOptions,
    ) -> Result<QueueOperationInfo>;
}
