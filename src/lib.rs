//! Memo Cache - A two-tier memoization cache
//!
//! Stores values under opaque keys with optional TTL expiration across a
//! durable and a session-scoped store, and wraps an HTTP request primitive so
//! repeated identical requests are answered from the cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod memo;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheEngine, EngineOptions, SharedEngine};
pub use config::Config;
pub use memo::{MemoizedCall, MemoizedRequest, RequestConfig};
pub use tasks::spawn_sweep_task;
