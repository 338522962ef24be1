//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `PUT /set`, `GET /get/:key`, `DELETE /del/:key` - Entry access
//! - `POST /clear`, `POST /clear-expired` - Maintenance
//! - `GET|PUT /max-elements` - Capacity
//! - `POST /fetch` - Memoized outbound request
//! - `GET /stats`, `GET /health` - Introspection

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
