//! Cache Module
//!
//! Two-tier memoization cache with TTL expiration and soft capacity limits.

mod codec;
mod engine;
mod entry;
pub mod keys;
mod stats;


use std::sync::Arc;

use parking_lot::Mutex;

// Re-export public types
pub use codec::{Codec, Lz4Codec};
pub use engine::{CacheEngine, EngineOptions, Tier};
pub use entry::{current_timestamp_ms, is_long_lived, CacheEntry};
pub use stats::CacheStats;

/// Engine handle shared between the service, the sweeper and request
/// callbacks. Engine calls are synchronous, so the lock is never held
/// across an await point.
pub type SharedEngine = Arc<Mutex<CacheEngine>>;

/// Wraps an engine into a [`SharedEngine`].
pub fn shared(engine: CacheEngine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}

// == Public Constants ==
/// Capacity used until one is configured
pub const DEFAULT_MAX_ELEMENTS: usize = 150;

/// Prefix of every key owned by the cache
pub const DEFAULT_NAMESPACE: &str = "__MEMOCACHE__";

/// TTLs above this many seconds are stored in the durable tier
pub const LONG_LIVED_THRESHOLD_SECS: i64 = 300;
