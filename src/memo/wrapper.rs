//! Memoized Request Module
//!
//! Drop-in wrapper around a request primitive that answers repeated requests
//! from the cache engine.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::SharedEngine;
use crate::memo::{CachedResult, MemoizedCall, Method, RequestConfig, ResponseStatus};

/// TTL applied when a call does not name one
pub const DEFAULT_REQUEST_TTL_SECS: i64 = 300;

// == Request Primitive ==
/// The underlying request mechanism.
///
/// It must invoke `on_success` when the request succeeds and `on_complete`
/// once it settles. Its native result is returned to callers untouched.
pub trait RequestPrimitive {
    type Native;

    fn send(&self, config: RequestConfig) -> Self::Native;
}

impl<F, N> RequestPrimitive for F
where
    F: Fn(RequestConfig) -> N,
{
    type Native = N;

    fn send(&self, config: RequestConfig) -> N {
        self(config)
    }
}

// == Cache Policy ==
/// Which requests are eligible for caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Requests without a method, GET and HEAD
    #[default]
    ReadOnly,
    /// Every method, POST included. Matches the historical behaviour whose
    /// method check could never reject anything.
    AllMethods,
}

impl CachePolicy {
    pub fn admits(&self, method: Option<Method>) -> bool {
        match self {
            CachePolicy::ReadOnly => method.map_or(true, |m| m.is_read_only()),
            CachePolicy::AllMethods => true,
        }
    }
}

// == Memoized Request ==
/// Serves eligible requests from the cache and records successful responses.
#[derive(Debug, Clone)]
pub struct MemoizedRequest<P> {
    engine: SharedEngine,
    primitive: P,
    policy: CachePolicy,
    default_ttl: i64,
}

impl<P: RequestPrimitive> MemoizedRequest<P> {
    pub fn new(engine: SharedEngine, primitive: P) -> Self {
        Self {
            engine,
            primitive,
            policy: CachePolicy::default(),
            default_ttl: DEFAULT_REQUEST_TTL_SECS,
        }
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_ttl(mut self, ttl_seconds: i64) -> Self {
        self.default_ttl = ttl_seconds;
        self
    }

    // == Call ==
    /// Issues `config`, or answers it from the cache.
    ///
    /// On a hit the success and completion callbacks run before this returns,
    /// with [`ResponseStatus::Cache`], and the primitive is never invoked. On a
    /// miss the success callback is wrapped so the payload is stored before
    /// the caller's own callback sees it. Ineligible requests go to the
    /// primitive unchanged.
    ///
    /// A `ttl_seconds` of None or zero falls back to the default TTL.
    pub fn call(&self, mut config: RequestConfig, ttl_seconds: Option<i64>) -> MemoizedCall<P::Native> {
        if config.url.is_empty() || !self.policy.admits(config.method) {
            return MemoizedCall::Delegated(self.primitive.send(config));
        }

        let ttl = ttl_seconds.filter(|t| *t != 0).unwrap_or(self.default_ttl);
        let key = config.cache_key();

        let cached = self.engine.lock().get(&key).filter(|v| !v.is_null());
        if let Some(value) = cached {
            debug!("Serving {} from cache", config.url);
            let status = ResponseStatus::Cache;
            if let Some(on_success) = config.on_success.take() {
                on_success(&value, &status);
            }
            if let Some(on_complete) = config.on_complete.take() {
                on_complete(&status);
            }
            return MemoizedCall::CacheHit(CachedResult::new(value, config.context.take()));
        }

        debug!("Cache miss for {}, delegating request", config.url);
        let original = config.on_success.take();
        let engine = Arc::clone(&self.engine);
        config.on_success = Some(Box::new(move |data: &Value, status: &ResponseStatus| {
            engine.lock().store(&key, data.clone(), Some(ttl));
            if let Some(original) = original {
                original(data, status);
            }
        }));

        MemoizedCall::Delegated(self.primitive.send(config))
    }
}
