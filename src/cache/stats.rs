//! Cache Statistics Module
//!
//! Tracks hits, misses, refused writes and reclaimed entries.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Loads answered from a live entry
    pub hits: u64,
    /// Loads that found nothing, an expired entry or an unreadable one
    pub misses: u64,
    /// New keys refused because the cache was at capacity
    pub rejected: u64,
    /// Writes dropped after the expire-and-retry cycle also failed
    pub write_failures: u64,
    /// Expired entries deleted by loads or sweeps
    pub reclaimed: u64,
    /// Current number of entries across both tiers
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was loaded yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_rejection(&mut self) {
        self.rejected += 1;
    }

    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }

    pub fn record_reclaimed(&mut self, count: usize) {
        self.reclaimed += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.rejected, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_reclaimed_accumulates() {
        let mut stats = CacheStats::new();
        stats.record_reclaimed(2);
        stats.record_reclaimed(0);
        stats.record_reclaimed(3);
        assert_eq!(stats.reclaimed, 5);
    }

    #[test]
    fn test_failure_counters() {
        let mut stats = CacheStats::new();
        stats.record_rejection();
        stats.record_write_failure();
        stats.record_write_failure();
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.write_failures, 2);
    }
}
