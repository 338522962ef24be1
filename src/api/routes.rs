//! API Routes
//!
//! Configures the Axum router with all cache service endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_expired_handler, clear_handler, delete_handler, fetch_handler,
    get_max_elements_handler, get_handler, health_handler, set_handler,
    set_max_elements_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a value
/// - `GET /get/:key` - Load a value
/// - `DELETE /del/:key` - Remove a value
/// - `POST /clear` - Remove every cache entry
/// - `POST /clear-expired` - Sweep expired entries
/// - `GET /max-elements`, `PUT /max-elements` - Read or change capacity
/// - `POST /fetch` - Memoized outbound request
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/clear", post(clear_handler))
        .route("/clear-expired", post(clear_expired_handler))
        .route(
            "/max-elements",
            get(get_max_elements_handler).put(set_max_elements_handler),
        )
        .route("/fetch", post(fetch_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEngine, EngineOptions};
    use crate::storage::MemoryStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn app() -> Router {
        let engine = CacheEngine::new(MemoryStore::new(), MemoryStore::new(), EngineOptions::default());
        create_router(AppState::new(engine))
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        app()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_maintenance_routes_are_post_only() {
        assert_eq!(status_of("POST", "/clear-expired").await, StatusCode::OK);
        assert_eq!(status_of("POST", "/clear").await, StatusCode::OK);
        assert_eq!(
            status_of("GET", "/clear-expired").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_max_elements_rejects_delete() {
        assert_eq!(status_of("GET", "/max-elements").await, StatusCode::OK);
        assert_eq!(
            status_of("DELETE", "/max-elements").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        assert_eq!(status_of("GET", "/keys").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_header_present() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
