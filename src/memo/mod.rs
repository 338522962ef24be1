//! Memoized Request Module
//!
//! Request deduplication layered on the cache engine.

mod http;
mod request;
mod result;
mod wrapper;

pub use http::HttpPrimitive;
pub use request::{CompleteCallback, Method, RequestConfig, ResponseStatus, SuccessCallback};
pub use result::{CachedResult, MemoizedCall};
pub use wrapper::{CachePolicy, MemoizedRequest, RequestPrimitive, DEFAULT_REQUEST_TTL_SECS};
