//! Cache Entry Module
//!
//! Defines the persisted form of a cached value and its expiration rule.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cached value with its write time and optional TTL.
///
/// Serialized as `{"value": .., "millis": .., "expireSecs": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Write timestamp (Unix milliseconds)
    #[serde(rename = "millis")]
    pub stored_at_millis: u64,
    /// TTL in seconds; None, zero or negative means no expiration
    #[serde(
        rename = "expireSecs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ttl_seconds: Option<i64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds
    pub fn new(value: Value, ttl_seconds: Option<i64>) -> Self {
        Self {
            value,
            stored_at_millis: current_timestamp_ms(),
            ttl_seconds,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired at `now_ms`.
    ///
    /// An entry expires once strictly more than `ttl_seconds * 1000`
    /// milliseconds have passed since it was written. Entries without a
    /// positive TTL never expire, and neither do entries whose lifetime in
    /// milliseconds does not fit in a u64.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.ttl_seconds {
            Some(ttl) if ttl > 0 => {
                let lifetime_ms = (ttl as u64).saturating_mul(1000);
                now_ms.saturating_sub(self.stored_at_millis) > lifetime_ms
            }
            _ => false,
        }
    }
}

// == Long Lived ==
/// Whether a TTL belongs in the durable tier.
///
/// Entries without a positive TTL, or with one above `threshold_secs`, are
/// long-lived.
pub fn is_long_lived(ttl_seconds: Option<i64>, threshold_secs: i64) -> bool {
    match ttl_seconds {
        None => true,
        Some(ttl) => ttl <= 0 || ttl > threshold_secs,
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_no_ttl_never_expires() {
        let entry = CacheEntry::new(json!("v"), None);
        assert!(!entry.is_expired_at(u64::MAX));
    }

    #[test]
    fn test_entry_non_positive_ttl_never_expires() {
        let zero = CacheEntry::new(json!(1), Some(0));
        let negative = CacheEntry::new(json!(1), Some(-5));

        assert!(!zero.is_expired_at(u64::MAX));
        assert!(!negative.is_expired_at(u64::MAX));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry {
            value: json!("test"),
            stored_at_millis: 1_000,
            ttl_seconds: Some(2),
        };

        // Exactly ttl elapsed is still live, one more millisecond expires it
        assert!(!entry.is_expired_at(3_000));
        assert!(entry.is_expired_at(3_001));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let max = CacheEntry {
            value: json!(1),
            stored_at_millis: 1_000,
            ttl_seconds: Some(i64::MAX),
        };
        // 2^61 * 1000 wraps to zero in u64 arithmetic
        let wrapping = CacheEntry {
            value: json!(1),
            stored_at_millis: 1_000,
            ttl_seconds: Some(1 << 61),
        };

        assert!(!max.is_expired_at(1_001));
        assert!(!max.is_expired_at(u64::MAX));
        assert!(!wrapping.is_expired_at(1_001));
        assert!(!wrapping.is_expired_at(u64::MAX));
    }

    #[test]
    fn test_wire_format() {
        let entry = CacheEntry {
            value: json!({"a": 1}),
            stored_at_millis: 42,
            ttl_seconds: Some(30),
        };

        let raw = serde_json::to_value(&entry).unwrap();
        assert_eq!(raw, json!({"value": {"a": 1}, "millis": 42, "expireSecs": 30}));

        let parsed: CacheEntry = serde_json::from_str(r#"{"value":"x","millis":7}"#).unwrap();
        assert_eq!(parsed.ttl_seconds, None);
        assert_eq!(parsed.value, json!("x"));
    }

    #[test]
    fn test_long_lived_threshold() {
        assert!(is_long_lived(None, 300));
        assert!(is_long_lived(Some(0), 300));
        assert!(is_long_lived(Some(-1), 300));
        assert!(is_long_lived(Some(301), 300));
        assert!(!is_long_lived(Some(300), 300));
        assert!(!is_long_lived(Some(30), 300));
    }
}
