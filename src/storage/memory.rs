//! In-Memory Store
//!
//! Session-scoped tier: contents live as long as the process.

use std::collections::HashMap;

use crate::error::{CacheError, Result};
use crate::storage::{KeyValueStore, Quota};

// == Memory Store ==
/// HashMap-backed store with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    quota: Quota,
    used_bytes: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects writes beyond `quota`.
    pub fn with_quota(quota: Quota) -> Self {
        Self {
            quota,
            ..Self::default()
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        let old_len = self.items.get(key).map_or(0, |v| key.len() + v.len());
        let new_len = key.len() + value.len();

        if !self.quota.admits(self.used_bytes, old_len, new_len) {
            return Err(CacheError::QuotaExceeded(format!(
                "memory store cannot fit {} more bytes",
                new_len
            )));
        }

        self.used_bytes = self.used_bytes - old_len + new_len;
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> bool {
        match self.items.remove(key) {
            Some(value) => {
                self.used_bytes -= key.len() + value.len();
                true
            }
            None => false,
        }
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }
}
