// src/request/builder.rs
// =============================================================================
// Turns matched links into request descriptors.
//
// For every (url, template) pair, in input order:
// 1. Build a base descriptor (GET, empty user data, derived unique key)
// 2. Add the caller's base user data, then merge the pattern's template
// 3. Run the caller's transform, which may reshape or drop the request
// Then keep the first `limit` survivors.
// =============================================================================

use super::descriptor::RequestDescriptor;
use super::template::RequestTemplate;
use crate::error::EnqueueError;
use crate::extract::has_scheme;
use serde_json::{Map, Value};
use tracing::debug;

// A caller-supplied hook that sees every request before it is enqueued.
//
// Return Some to keep the (possibly modified) request, None to drop it.
// Any `Fn(RequestDescriptor) -> Option<RequestDescriptor>` closure works.
pub trait TransformRequest: Send + Sync {
    fn transform(&self, request: RequestDescriptor) -> Option<RequestDescriptor>;
}

impl<F> TransformRequest for F
where
    F: Fn(RequestDescriptor) -> Option<RequestDescriptor> + Send + Sync,
{
    fn transform(&self, request: RequestDescriptor) -> Option<RequestDescriptor> {
        self(request)
    }
}

/// Settings shared by every request built in one call
#[derive(Clone, Copy)]
pub struct BuildOptions<'a> {
    pub keep_url_fragment: bool,
    pub user_data: &'a Map<String, Value>,
    pub transform: Option<&'a dyn TransformRequest>,
    pub limit: Option<usize>,
}

// Builds the requests for a sequence of matched links.
//
// Dropped items (transform returned None) are not errors. A surviving request
// whose URL is not absolute is, because the queue can't fetch it.
pub fn build_requests<'t>(
    candidates: impl IntoIterator<Item = (String, Option<&'t RequestTemplate>)>,
    options: BuildOptions<'_>,
) -> Result<Vec<RequestDescriptor>, EnqueueError> {
    let mut requests = Vec::new();

    for (url, template) in candidates {
        let mut request = RequestDescriptor::new(url).with_keep_url_fragment(options.keep_url_fragment);
        request.user_data = options.user_data.clone();
        if let Some(template) = template {
            template.apply_to(&mut request);
        }

        let request = match options.transform {
            Some(transform) => match apply_transform(transform, request) {
                Some(request) => request,
                None => continue,
            },
            None => request,
        };

        requests.push(request);
    }

    if let Some(limit) = options.limit {
        if requests.len() > limit {
            debug!(limit, dropped = requests.len() - limit, "truncating requests to limit");
            requests.truncate(limit);
        }
    }

    for request in &requests {
        if request.url.trim().is_empty() || !has_scheme(&request.url) {
            return Err(EnqueueError::InvalidRequest {
                url: request.url.clone(),
            });
        }
    }

    Ok(requests)
}

// Runs the transform on one request.
//
// A derived unique key follows the URL: if the transform moved the request
// to another URL (or flipped fragment handling) but left the key alone, the
// key is derived again. A key the transform set itself is kept.
fn apply_transform(
    transform: &dyn TransformRequest,
    request: RequestDescriptor,
) -> Option<RequestDescriptor> {
    let url_before = request.url.clone();
    let keep_before = request.keep_url_fragment;
    let key_before = request.unique_key.clone();

    let Some(mut request) = transform.transform(request) else {
        debug!(url = %url_before, "transform dropped request");
        return None;
    };

    let moved = request.url != url_before || request.keep_url_fragment != keep_before;
    if moved && request.unique_key == key_before {
        request.unique_key = request.derived_unique_key();
    }

    Some(request)
}
