//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{EngineOptions, DEFAULT_NAMESPACE, LONG_LIVED_THRESHOLD_SECS};
use crate::memo::{CachePolicy, DEFAULT_REQUEST_TTL_SECS};

/// Default byte quota of each tier
const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Prefix of every key the cache owns
    pub namespace: String,
    /// File backing the durable tier
    pub data_file: PathBuf,
    /// Byte quota of the durable tier
    pub durable_quota_bytes: usize,
    /// Byte quota of the session tier
    pub session_quota_bytes: usize,
    /// Compress stored payloads
    pub compression: bool,
    /// Pause between a write and the sweep it requests, in milliseconds
    pub sweep_delay_ms: u64,
    /// Periodic safety sweep interval in seconds
    pub sweep_interval: u64,
    /// TTL in seconds for memoized requests that do not name one
    pub default_request_ttl: i64,
    /// Cache every request method, not only GET and HEAD
    pub cache_all_methods: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_NAMESPACE` - Key prefix (default: `__MEMOCACHE__`)
    /// - `DATA_FILE` - Durable tier file (default: `memo_cache.json`)
    /// - `DURABLE_QUOTA_BYTES` / `SESSION_QUOTA_BYTES` - Tier quotas (default: 5 MiB)
    /// - `COMPRESSION` - Compress payloads (default: false)
    /// - `SWEEP_DELAY_MS` - Deferred sweep delay (default: 10)
    /// - `SWEEP_INTERVAL` - Safety sweep frequency in seconds (default: 60)
    /// - `DEFAULT_REQUEST_TTL` - Memoized request TTL in seconds (default: 300)
    /// - `CACHE_ALL_METHODS` - Cache non-GET requests too (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var(&lookup, "SERVER_PORT", defaults.server_port),
            namespace: lookup("CACHE_NAMESPACE")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.namespace),
            data_file: lookup("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            durable_quota_bytes: parse_var(&lookup, "DURABLE_QUOTA_BYTES", defaults.durable_quota_bytes),
            session_quota_bytes: parse_var(&lookup, "SESSION_QUOTA_BYTES", defaults.session_quota_bytes),
            compression: parse_var(&lookup, "COMPRESSION", defaults.compression),
            sweep_delay_ms: parse_var(&lookup, "SWEEP_DELAY_MS", defaults.sweep_delay_ms),
            sweep_interval: parse_var(&lookup, "SWEEP_INTERVAL", defaults.sweep_interval),
            default_request_ttl: parse_var(&lookup, "DEFAULT_REQUEST_TTL", defaults.default_request_ttl),
            cache_all_methods: parse_var(&lookup, "CACHE_ALL_METHODS", defaults.cache_all_methods),
        }
    }

    /// Engine settings derived from this configuration.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            namespace: self.namespace.clone(),
            long_lived_threshold_secs: LONG_LIVED_THRESHOLD_SECS,
            compression: self.compression,
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        if self.cache_all_methods {
            CachePolicy::AllMethods
        } else {
            CachePolicy::ReadOnly
        }
    }

    pub fn sweep_delay(&self) -> Duration {
        Duration::from_millis(self.sweep_delay_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            namespace: DEFAULT_NAMESPACE.to_string(),
            data_file: PathBuf::from("memo_cache.json"),
            durable_quota_bytes: DEFAULT_QUOTA_BYTES,
            session_quota_bytes: DEFAULT_QUOTA_BYTES,
            compression: false,
            sweep_delay_ms: 10,
            sweep_interval: 60,
            default_request_ttl: DEFAULT_REQUEST_TTL_SECS,
            cache_all_methods: false,
        }
    }
}

/// Reads and parses a variable through `lookup`, falling back to `default`.
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    lookup(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.namespace, "__MEMOCACHE__");
        assert_eq!(config.sweep_delay_ms, 10);
        assert_eq!(config.default_request_ttl, 300);
        assert!(!config.compression);
        assert_eq!(config.cache_policy(), CachePolicy::ReadOnly);
    }

    #[test]
    fn test_config_from_empty_lookup() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert!(!config.compression);
        assert_eq!(config.sweep_delay(), Duration::from_millis(10));
        assert_eq!(config.cache_policy(), CachePolicy::ReadOnly);
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SERVER_PORT", "8080"),
            ("CACHE_NAMESPACE", "__APP__"),
            ("COMPRESSION", "true"),
            ("SWEEP_INTERVAL", "0"),
            ("CACHE_ALL_METHODS", "true"),
            ("DEFAULT_REQUEST_TTL", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.namespace, "__APP__");
        assert!(config.compression);
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
        assert_eq!(config.cache_policy(), CachePolicy::AllMethods);
        // Unparseable values keep the default
        assert_eq!(config.default_request_ttl, 300);
    }

    #[test]
    fn test_engine_options_follow_config() {
        let config = Config {
            namespace: "__APP__".to_string(),
            compression: true,
            ..Config::default()
        };

        let options = config.engine_options();
        assert_eq!(options.namespace, "__APP__");
        assert!(options.compression);
        assert_eq!(options.long_lived_threshold_secs, 300);
    }
}
