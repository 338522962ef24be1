//! Key Module
//!
//! Maps logical cache keys onto namespaced physical store keys.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Physical key for `logical` under `namespace`.
pub fn namespaced_key(namespace: &str, logical: &str) -> String {
    format!("{}{}", namespace, BASE64.encode(logical))
}

/// Whether a physical key is owned by the cache.
pub fn is_namespaced(namespace: &str, physical: &str) -> bool {
    physical.starts_with(namespace)
}

/// Reserved durable-tier key holding the configured capacity.
pub fn max_elements_key(namespace: &str) -> String {
    format!("maxElements{}", namespace)
}
