//! Cache Engine Module
//!
//! Main cache engine: two-tier storage with TTL expiration, soft capacity
//! admission and optional payload compression.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::cache::entry::{current_timestamp_ms, is_long_lived};
use crate::cache::keys::{is_namespaced, max_elements_key, namespaced_key};
use crate::cache::{
    CacheEntry, CacheStats, Codec, Lz4Codec, DEFAULT_MAX_ELEMENTS, DEFAULT_NAMESPACE,
    LONG_LIVED_THRESHOLD_SECS,
};
use crate::error::{CacheError, Result};
use crate::storage::KeyValueStore;

// == Tier ==
/// The two storage tiers an entry can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Survives restarts
    Durable,
    /// Cleared with the session
    Session,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Durable => write!(f, "durable"),
            Tier::Session => write!(f, "session"),
        }
    }
}

// == Engine Options ==
/// Construction-time settings of a [`CacheEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Prefix marking every key owned by the cache
    pub namespace: String,
    /// TTLs above this many seconds go to the durable tier
    pub long_lived_threshold_secs: i64,
    /// Compress payloads through the engine's codec
    pub compression: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            long_lived_threshold_secs: LONG_LIVED_THRESHOLD_SECS,
            compression: false,
        }
    }
}

// == Cache Engine ==
/// Two-tier cache over injected key-value stores.
pub struct CacheEngine {
    /// Long-lived entries and the capacity setting
    durable: Box<dyn KeyValueStore>,
    /// Short-lived entries
    session: Box<dyn KeyValueStore>,
    codec: Box<dyn Codec>,
    options: EngineOptions,
    /// Namespaced entries across both tiers, maintained incrementally
    size: usize,
    stats: CacheStats,
    /// Raised after each successful write to wake the sweeper
    sweep_signal: Option<Arc<Notify>>,
    sweep_pending: bool,
}

impl fmt::Debug for CacheEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEngine")
            .field("options", &self.options)
            .field("size", &self.size)
            .field("stats", &self.stats)
            .field("sweep_pending", &self.sweep_pending)
            .finish()
    }
}

impl CacheEngine {
    // == Constructor ==
    /// Creates an engine over the two stores.
    ///
    /// Persists the default capacity if none is configured yet, then counts
    /// the namespaced entries already present in both stores. This is the
    /// only full enumeration outside of maintenance sweeps.
    pub fn new(
        durable: impl KeyValueStore + 'static,
        session: impl KeyValueStore + 'static,
        options: EngineOptions,
    ) -> Self {
        let mut engine = Self {
            durable: Box::new(durable),
            session: Box::new(session),
            codec: Box::new(Lz4Codec),
            options,
            size: 0,
            stats: CacheStats::new(),
            sweep_signal: None,
            sweep_pending: false,
        };

        let config_key = max_elements_key(&engine.options.namespace);
        if !engine.durable.contains_key(&config_key) {
            if let Err(e) = engine
                .durable
                .set_item(&config_key, DEFAULT_MAX_ELEMENTS.to_string())
            {
                warn!("Could not persist default capacity: {}", e);
            }
        }

        let namespace = &engine.options.namespace;
        engine.size = [&engine.durable, &engine.session]
            .iter()
            .map(|store| {
                store
                    .keys()
                    .iter()
                    .filter(|k| is_namespaced(namespace, k))
                    .count()
            })
            .sum();

        debug!("Cache engine initialized with {} entries", engine.size);
        engine
    }

    /// Replaces the payload codec used when compression is enabled.
    pub fn with_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    /// Registers the signal raised whenever a deferred sweep is requested.
    pub fn with_sweep_signal(mut self, signal: Arc<Notify>) -> Self {
        self.sweep_signal = Some(signal);
        self
    }

    // == Capacity ==
    /// Persists a new capacity.
    ///
    /// Lowering the capacity sweeps expired entries right away but never
    /// evicts live ones.
    pub fn set_max_elements(&mut self, max_elements: usize) -> Result<()> {
        if max_elements == 0 {
            return Err(CacheError::InvalidRequest(
                "max elements must be positive".to_string(),
            ));
        }

        let previous = self.max_elements();
        let config_key = max_elements_key(&self.options.namespace);
        self.durable
            .set_item(&config_key, max_elements.to_string())?;

        if previous > max_elements {
            self.clear_expired();
        }
        Ok(())
    }

    /// Returns the persisted capacity, or the default of 150.
    pub fn max_elements(&self) -> usize {
        self.durable
            .get_item(&max_elements_key(&self.options.namespace))
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_ELEMENTS)
    }

    /// Returns the number of entries across both tiers.
    pub fn size(&self) -> usize {
        self.size
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.size);
        stats
    }

    // == Load ==
    /// Returns the live value under `key`, or `default`.
    pub fn load(&mut self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    // == Get ==
    /// Looks `key` up in the durable tier, then the session tier.
    ///
    /// Expired entries are deleted and reported as a miss. Unreadable entries
    /// are reported as a miss and left in place.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let physical = namespaced_key(&self.options.namespace, key);

        let found = match self.durable.get_item(&physical) {
            Some(raw) => Some((Tier::Durable, raw)),
            None => self
                .session
                .get_item(&physical)
                .map(|raw| (Tier::Session, raw)),
        };

        let Some((tier, raw)) = found else {
            debug!("Cache miss: {}", key);
            self.stats.record_miss();
            return None;
        };

        let entry = match self.decode_entry(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Treating unreadable entry {} as a miss: {}", key, e);
                self.stats.record_miss();
                return None;
            }
        };

        if entry.is_expired_at(current_timestamp_ms()) {
            if self.tier_mut(tier).remove_item(&physical) {
                self.size = self.size.saturating_sub(1);
                self.stats.record_reclaimed(1);
            }
            debug!("Cache entry expired: {}", key);
            self.stats.record_miss();
            return None;
        }

        debug!("Cache hit in {} tier: {}", tier, key);
        self.stats.record_hit();
        Some(entry.value)
    }

    // == Get Or Compute ==
    /// Returns the cached value, or computes, stores and returns it.
    ///
    /// `producer` runs at most once and only on a miss. Its error is
    /// returned unchanged and nothing is stored.
    pub fn get_or_compute<F, E>(
        &mut self,
        key: &str,
        producer: F,
        ttl_seconds: Option<i64>,
    ) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> std::result::Result<Value, E>,
    {
        if let Some(value) = self.get(key).filter(|v| !v.is_null()) {
            return Ok(value);
        }
        let value = producer()?;
        Ok(self.store(key, value, ttl_seconds))
    }

    // == Store ==
    /// Caches `value` under `key` when possible and hands it back.
    ///
    /// Caching is best effort: a null value, a full cache or a failing store
    /// leave the value uncached without reporting an error.
    pub fn store(&mut self, key: &str, value: Value, ttl_seconds: Option<i64>) -> Value {
        if value.is_null() {
            return value;
        }

        let capacity = self.max_elements();
        if self.size >= capacity {
            self.clear_expired();
        }

        let physical = namespaced_key(&self.options.namespace, key);
        let existing = self.locate(&physical);

        // Capacity only gates new keys
        if existing.is_none() && self.size >= capacity {
            warn!(
                "Cache is full. Size: {}, max elements: {}",
                self.size, capacity
            );
            self.stats.record_rejection();
            return value;
        }

        let entry = CacheEntry::new(value, ttl_seconds);
        let raw = match self.encode_entry(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not encode entry {}: {}", key, e);
                self.stats.record_write_failure();
                return entry.value;
            }
        };

        let target = if is_long_lived(ttl_seconds, self.options.long_lived_threshold_secs) {
            Tier::Durable
        } else {
            Tier::Session
        };

        let mut counted = existing.is_some();
        if let Some(current) = existing.filter(|t| *t != target) {
            if self.tier_mut(current).remove_item(&physical) {
                self.size = self.size.saturating_sub(1);
            }
            counted = false;
        }

        let written = match self.tier_mut(target).set_item(&physical, raw.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!("Write of {} failed ({}), sweeping before retry", key, e);
                self.clear_expired();
                // The sweep may have reclaimed an expired previous version
                counted = counted && self.tier_ref(target).contains_key(&physical);
                match self.tier_mut(target).set_item(&physical, raw) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Giving up caching {}: {}", key, e);
                        false
                    }
                }
            }
        };

        if written {
            if !counted {
                self.size += 1;
            }
            self.schedule_sweep();
        } else {
            self.stats.record_write_failure();
        }

        entry.value
    }

    // == Remove ==
    /// Deletes `key` from whichever tier holds it.
    ///
    /// Returns whether an entry was deleted.
    pub fn remove(&mut self, key: &str) -> bool {
        let physical = namespaced_key(&self.options.namespace, key);
        let removed =
            self.durable.remove_item(&physical) || self.session.remove_item(&physical);
        if removed {
            self.size = self.size.saturating_sub(1);
        }
        removed
    }

    // == Clear All ==
    /// Deletes every namespaced entry in both tiers.
    ///
    /// Returns the number of entries deleted.
    pub fn clear_all(&mut self) -> usize {
        let mut removed = 0;
        for tier in [Tier::Durable, Tier::Session] {
            let owned: Vec<String> = self
                .tier_ref(tier)
                .keys()
                .into_iter()
                .filter(|key| is_namespaced(&self.options.namespace, key))
                .collect();
            removed += self.tier_mut(tier).remove_items(&owned);
        }

        self.size = self.size.saturating_sub(removed);
        info!("Cleared {} cache entries", removed);
        removed
    }

    // == Clear Expired ==
    /// Deletes every expired namespaced entry in both tiers.
    ///
    /// Unreadable entries are skipped. Returns the number of entries removed.
    pub fn clear_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let mut removed = 0;

        for tier in [Tier::Durable, Tier::Session] {
            let expired: Vec<String> = self
                .tier_ref(tier)
                .keys()
                .into_iter()
                .filter(|key| is_namespaced(&self.options.namespace, key))
                .filter(|key| {
                    self.tier_ref(tier)
                        .get_item(key)
                        .and_then(|raw| self.decode_entry(&raw).ok())
                        .is_some_and(|entry| entry.is_expired_at(now))
                })
                .collect();

            removed += self.tier_mut(tier).remove_items(&expired);
        }

        self.size = self.size.saturating_sub(removed);
        self.stats.record_reclaimed(removed);

        if removed > 0 {
            info!("Expiration sweep: removed {} expired entries", removed);
        } else {
            debug!("Expiration sweep: no expired entries found");
        }
        removed
    }

    // == Deferred Sweep ==
    /// Runs the sweep requested by earlier writes, if any.
    ///
    /// Returns the number of entries removed.
    pub fn run_pending_sweep(&mut self) -> usize {
        if !self.sweep_pending {
            return 0;
        }
        self.sweep_pending = false;
        self.clear_expired()
    }

    /// Whether a write has requested a sweep that has not run yet.
    pub fn sweep_pending(&self) -> bool {
        self.sweep_pending
    }

    fn schedule_sweep(&mut self) {
        self.sweep_pending = true;
        if let Some(signal) = &self.sweep_signal {
            signal.notify_one();
        }
    }

    // == Tier Lookup ==
    /// Returns the tier currently holding `key`.
    pub fn tier_of(&self, key: &str) -> Option<Tier> {
        self.locate(&namespaced_key(&self.options.namespace, key))
    }

    fn locate(&self, physical: &str) -> Option<Tier> {
        if self.durable.contains_key(physical) {
            Some(Tier::Durable)
        } else if self.session.contains_key(physical) {
            Some(Tier::Session)
        } else {
            None
        }
    }

    fn tier_ref(&self, tier: Tier) -> &dyn KeyValueStore {
        match tier {
            Tier::Durable => self.durable.as_ref(),
            Tier::Session => self.session.as_ref(),
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut dyn KeyValueStore {
        match tier {
            Tier::Durable => self.durable.as_mut(),
            Tier::Session => self.session.as_mut(),
        }
    }

    // == Encoding ==
    fn encode_entry(&self, entry: &CacheEntry) -> Result<String> {
        let json = serde_json::to_string(entry)?;
        if self.options.compression {
            self.codec.compress(&json)
        } else {
            Ok(json)
        }
    }

    fn decode_entry(&self, raw: &str) -> Result<CacheEntry> {
        if self.options.compression {
            let json = self.codec.decompress(raw)?;
            Ok(serde_json::from_str(&json)?)
        } else {
            Ok(serde_json::from_str(raw)?)
        }
    }
}
