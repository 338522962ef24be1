//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CacheError, Result};
use crate::memo::{Method, RequestConfig};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The logical cache key
/// - `value`: Any JSON value except null
/// - `ttl`: Optional TTL in seconds; absent or non-positive never expires
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.value.is_null() {
            return Some("Null values are never cached".to_string());
        }
        None
    }
}

/// Request body for PUT /max-elements
#[derive(Debug, Clone, Deserialize)]
pub struct MaxElementsRequest {
    pub max_elements: usize,
}

/// Request body for POST /fetch, a memoized outbound request
#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub method: Option<String>,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl FetchRequest {
    /// Converts the body into a request configuration.
    pub fn into_config(self) -> Result<RequestConfig> {
        if self.url.is_empty() {
            return Err(CacheError::InvalidRequest("URL cannot be empty".to_string()));
        }

        let method = self
            .method
            .as_deref()
            .map(str::parse::<Method>)
            .transpose()?;

        Ok(RequestConfig {
            method,
            url: self.url,
            headers: self.headers,
            data: self.data,
            ..RequestConfig::default()
        })
    }
}
