// src/lib.rs
// =============================================================================
// link-enqueuer: the link-discovery stage of a crawler.
//
// Given "the page I just fetched", produce "the new fetch tasks to schedule":
//
//   page/document --extract--> URLs --patterns--> (URL, template)
//                 --build--> requests --batches--> request queue
//
// Modules:
// - extract: pull link targets out of a rendered page or a parsed document
// - patterns: URL patterns (exact, glob, regex, custom) and matching
// - request: request descriptors, templates, unique keys, transforms
// - queue: the request queue interface, batched submission, a memory queue
// - enqueue: enqueue_links, which ties it all together
// - config: TOML configuration for enqueue runs
// - error: error types
// =============================================================================

pub mod config;
pub mod enqueue;
pub mod error;
pub mod extract;
pub mod patterns;
pub mod queue;
pub mod request;

pub use enqueue::{enqueue_links, EnqueueOptions, ValidatedOptions, DEFAULT_SELECTOR};
pub use error::{ConfigError, EnqueueError};
pub use extract::{HtmlDocument, LinkSource, PageSnapshot, ParsedDocument, RenderedPage};
pub use patterns::{PatternSpec, UrlMatcher, UrlPattern};
pub use queue::{AddRequestOptions, MemoryRequestQueue, QueueOperationInfo, RequestQueue};
pub use request::{Method, RequestDescriptor, RequestTemplate, TransformRequest};
