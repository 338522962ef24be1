//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, Tier};

/// Response body for GET /get/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT /set
///
/// `tier` is None when the value was returned without being cached.
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
    pub tier: Option<String>,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, tier: Option<Tier>) -> Self {
        let key = key.into();
        let message = match tier {
            Some(tier) => format!("Key '{}' cached in {} tier", key, tier),
            None => format!("Key '{}' was not cached", key),
        };
        Self {
            message,
            key,
            tier: tier.map(|t| t.to_string()),
        }
    }
}

/// Response body for DELETE /del/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for POST /clear and POST /clear-expired
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
    pub size: usize,
}

/// Response body for GET and PUT /max-elements
#[derive(Debug, Clone, Serialize)]
pub struct MaxElementsResponse {
    pub max_elements: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub rejected: u64,
    pub write_failures: u64,
    pub reclaimed: u64,
    pub total_entries: usize,
    pub max_elements: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, max_elements: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            rejected: stats.rejected,
            write_failures: stats.write_failures,
            reclaimed: stats.reclaimed,
            total_entries: stats.total_entries,
            max_elements,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for POST /fetch
#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    /// "cache" or "network"
    pub source: &'static str,
    pub value: Value,
}

impl FetchResponse {
    pub fn cached(value: Value) -> Self {
        Self {
            source: "cache",
            value,
        }
    }

    pub fn network(value: Value) -> Self {
        Self {
            source: "network",
            value,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
