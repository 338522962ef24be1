//! Storage Module
//!
//! Key-value stores backing the two cache tiers.
//!
//! The engine only talks to a store through [`KeyValueStore`], so any host
//! storage (browser-like local/session storage, a file, a database table) can
//! be plugged in as long as it offers string keys and string values.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

// == Key Value Store ==
/// String-to-string store used as one cache tier.
pub trait KeyValueStore: Send {
    /// Returns the raw value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Writes `value` under `key`.
    ///
    /// Fails with [`CacheError::QuotaExceeded`](crate::error::CacheError::QuotaExceeded)
    /// when the store has no room left for the value.
    fn set_item(&mut self, key: &str, value: String) -> Result<()>;

    /// Removes `key`, returning whether it was present.
    fn remove_item(&mut self, key: &str) -> bool;

    /// Removes every key in `keys`, returning how many were present.
    ///
    /// Stores with a per-mutation cost override this to pay it once.
    fn remove_items(&mut self, keys: &[String]) -> usize {
        keys.iter().filter(|key| self.remove_item(key)).count()
    }

    /// Enumerates every key currently held.
    fn keys(&self) -> Vec<String>;

    /// Existence check that does not hand out the value.
    fn contains_key(&self, key: &str) -> bool {
        self.get_item(key).is_some()
    }
}

// == Quota ==
/// Byte budget of a store, counted as the sum of key and value lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quota {
    limit: Option<usize>,
}

impl Quota {
    /// A quota that never rejects a write.
    pub fn unlimited() -> Self {
        Self { limit: None }
    }

    /// A quota of `bytes` bytes.
    pub fn bytes(bytes: usize) -> Self {
        Self { limit: Some(bytes) }
    }

    /// Checks whether replacing `old_len` bytes with `new_len` bytes fits
    /// given `used` bytes currently in the store.
    pub fn admits(&self, used: usize, old_len: usize, new_len: usize) -> bool {
        match self.limit {
            Some(limit) => used.saturating_sub(old_len) + new_len <= limit,
            None => true,
        }
    }
}
