// src/queue/batch.rs
// =============================================================================
// Submits requests to the queue in bounded concurrent batches.
//
// How it works:
// 1. Take the next BATCH_SIZE requests
// 2. Send them all to the queue at once and wait until every one settles
// 3. If any failed, stop: later batches never start
// 4. Otherwise record the outcomes and go back to 1
//
// Within a batch the queue may finish requests in any order. join_all hands
// results back in the order the futures were created, so the outcome list
// always lines up with the request list.
// =============================================================================

use super::{AddRequestOptions, QueueOperationInfo, RequestQueue};
use crate::error::EnqueueError;
use crate::request::RequestDescriptor;
use futures::future::join_all;
use tracing::{debug, warn};

/// How many requests are in flight against the queue at once
pub const BATCH_SIZE: usize = 5;

// Adds every request to the queue and returns the outcomes in input order.
//
// On failure, requests from earlier batches (and the rest of the failing
// batch) have already been added; there is no rollback.
pub async fn submit_in_batches(
    queue: &dyn RequestQueue,
    requests: Vec<RequestDescriptor>,
    options: AddRequestOptions,
) -> Result<Vec<QueueOperationInfo>, EnqueueError> {
    submit_with_batch_size(queue, requests, options, BATCH_SIZE).await
}

pub(crate) async fn submit_with_batch_size(
    queue: &dyn RequestQueue,
    requests: Vec<RequestDescriptor>,
    options: AddRequestOptions,
    batch_size: usize,
) -> Result<Vec<QueueOperationInfo>, EnqueueError> {
    let batch_size = batch_size.max(1);
    let mut outcomes = Vec::with_capacity(requests.len());
    let mut remaining = requests.into_iter();

    loop {
        let batch: Vec<RequestDescriptor> = remaining.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }

        let urls: Vec<String> = batch.iter().map(|request| request.url.clone()).collect();
        debug!(size = batch.len(), done = outcomes.len(), "submitting batch");

        // Every future in the batch runs to completion, even if one fails
        let results = join_all(
            batch
                .into_iter()
                .map(|request| queue.add_request(request, options)),
        )
        .await;

        for (url, result) in urls.into_iter().zip(results) {
            match result {
                Ok(info) => outcomes.push(info),
                Err(source) => {
                    warn!(%url, error = %source, "queue rejected request, aborting remaining batches");
                    return Err(EnqueueError::Queue { url, source });
                }
            }
        }
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn requests(count: usize) -> Vec<RequestDescriptor> {
        (0..count)
            .map(|i| RequestDescriptor::new(format!("https://x.com/{}", i)))
            .collect()
    }

    fn info_for(request: &RequestDescriptor) -> QueueOperationInfo {
        QueueOperationInfo {
            request_id: request.url.clone(),
            was_already_present: false,
            was_already_handled: false,
            unique_key: request.unique_key.clone(),
        }
    }

    // Finishes later requests first and keeps track of concurrency
    #[derive(Default)]
    struct SlowFirstQueue {
        completed: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl RequestQueue for SlowFirstQueue {
        async fn add_request(
            &self,
            request: RequestDescriptor,
            _options: AddRequestOptions,
        ) -> Result<QueueOperationInfo> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let index: u64 = request.url.rsplit('/').next().unwrap().parse().unwrap();
            tokio::time::sleep(Duration::from_millis(50 - (index % 5) * 10)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.completed.lock().unwrap().push(request.url.clone());
            Ok(info_for(&request))
        }
    }

    // Fails one URL and records every submission it sees
    struct FailingQueue {
        fail_url: String,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RequestQueue for FailingQueue {
        async fn add_request(
            &self,
            request: RequestDescriptor,
            _options: AddRequestOptions,
        ) -> Result<QueueOperationInfo> {
            self.seen.lock().unwrap().push(request.url.clone());
            if request.url == self.fail_url {
                return Err(anyhow!("backend unavailable"));
            }
            Ok(info_for(&request))
        }
    }

    #[tokio::test]
    async fn test_outcomes_follow_input_order() {
        let queue = SlowFirstQueue::default();
        let outcomes = submit_in_batches(&queue, requests(7), AddRequestOptions::default())
            .await
            .unwrap();

        let ids: Vec<String> = outcomes.into_iter().map(|info| info.request_id).collect();
        let expected: Vec<String> = (0..7).map(|i| format!("https://x.com/{}", i)).collect();
        assert_eq!(ids, expected);

        // The queue really did finish them out of order
        let completed = queue.completed.lock().unwrap().clone();
        assert_ne!(completed, expected);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded_by_batch_size() {
        let queue = SlowFirstQueue::default();
        submit_with_batch_size(&queue, requests(9), AddRequestOptions::default(), 3)
            .await
            .unwrap();
        assert_eq!(queue.max_in_flight.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failure_aborts_later_batches() {
        let queue = FailingQueue {
            fail_url: "https://x.com/2".to_string(),
            seen: Mutex::new(Vec::new()),
        };
        let err = submit_with_batch_size(&queue, requests(6), AddRequestOptions::default(), 2)
            .await
            .unwrap_err();

        assert!(matches!(err, EnqueueError::Queue { ref url, .. } if url == "https://x.com/2"));

        // Batch [0, 1] and the failing batch [2, 3] ran in full; [4, 5] never started
        let mut seen = queue.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec!["https://x.com/0", "https://x.com/1", "https://x.com/2", "https://x.com/3"]
        );
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let queue = FailingQueue {
            fail_url: String::new(),
            seen: Mutex::new(Vec::new()),
        };
        let outcomes = submit_in_batches(&queue, Vec::new(), AddRequestOptions::default())
            .await
            .unwrap();
        assert!(outcomes.is_empty());
        assert!(queue.seen.lock().unwrap().is_empty());
    }
}
