//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio::sync::Notify;

use crate::cache::{shared, CacheEngine, SharedEngine};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::memo::{HttpPrimitive, MemoizedCall, MemoizedRequest};
use crate::models::{
    ClearResponse, DeleteResponse, FetchRequest, FetchResponse, GetResponse, HealthResponse,
    MaxElementsRequest, MaxElementsResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::storage::{FileStore, MemoryStore, Quota};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache engine
    pub cache: SharedEngine,
    /// Memoizing wrapper around the outbound HTTP client
    pub fetcher: MemoizedRequest<HttpPrimitive>,
}

impl AppState {
    /// Creates a new AppState around an engine, with default wrapper settings.
    pub fn new(engine: CacheEngine) -> Self {
        let cache = shared(engine);
        let fetcher = MemoizedRequest::new(cache.clone(), HttpPrimitive::new());
        Self { cache, fetcher }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the durable file store, builds the session store and wires the
    /// engine to `sweep_signal`.
    pub fn from_config(config: &Config, sweep_signal: Arc<Notify>) -> Result<Self> {
        let durable = FileStore::open(&config.data_file, Quota::bytes(config.durable_quota_bytes))?;
        let session = MemoryStore::with_quota(Quota::bytes(config.session_quota_bytes));
        let engine = CacheEngine::new(durable, session, config.engine_options())
            .with_sweep_signal(sweep_signal);

        let cache = shared(engine);
        let fetcher = MemoizedRequest::new(cache.clone(), HttpPrimitive::new())
            .with_policy(config.cache_policy())
            .with_default_ttl(config.default_request_ttl);
        Ok(Self { cache, fetcher })
    }
}

/// Handler for PUT /set
///
/// Stores a value; the response names the tier it landed in, if any.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.lock();
    cache.store(&req.key, req.value, req.ttl);
    let tier = cache.tier_of(&req.key);

    Ok(Json(SetResponse::new(req.key, tier)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .lock()
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.lock().remove(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.lock();
    let removed = cache.clear_all();

    Json(ClearResponse {
        removed,
        size: cache.size(),
    })
}

/// Handler for POST /clear-expired
pub async fn clear_expired_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.lock();
    let removed = cache.clear_expired();

    Json(ClearResponse {
        removed,
        size: cache.size(),
    })
}

/// Handler for GET /max-elements
pub async fn get_max_elements_handler(State(state): State<AppState>) -> Json<MaxElementsResponse> {
    Json(MaxElementsResponse {
        max_elements: state.cache.lock().max_elements(),
    })
}

/// Handler for PUT /max-elements
pub async fn set_max_elements_handler(
    State(state): State<AppState>,
    Json(req): Json<MaxElementsRequest>,
) -> Result<Json<MaxElementsResponse>> {
    let mut cache = state.cache.lock();
    cache.set_max_elements(req.max_elements)?;

    Ok(Json(MaxElementsResponse {
        max_elements: cache.max_elements(),
    }))
}

/// Handler for POST /fetch
///
/// Issues the described request through the memoizing wrapper.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<FetchResponse>> {
    let ttl = req.ttl;
    let config = req.into_config()?;

    match state.fetcher.call(config, ttl) {
        MemoizedCall::CacheHit(result) => Ok(Json(FetchResponse::cached(result.into_value()))),
        MemoizedCall::Delegated(handle) => {
            let value = handle
                .await
                .map_err(|e| CacheError::Internal(e.to_string()))??;
            Ok(Json(FetchResponse::network(value)))
        }
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.lock();
    Json(StatsResponse::new(&cache.stats(), cache.max_elements()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
