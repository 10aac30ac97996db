// src/request/mod.rs
// =============================================================================
// This module builds the requests that end up in the queue.
//
// Submodules:
// - descriptor: the request itself, plus unique-key normalization
// - template: partial requests attached to URL patterns
// - builder: links + templates + caller hooks -> requests
// =============================================================================

mod builder;
mod descriptor;
mod template;

pub use builder::{build_requests, BuildOptions, TransformRequest};
pub use descriptor::{derive_unique_key, normalize_url, Method, RequestDescriptor};
pub use template::RequestTemplate;
