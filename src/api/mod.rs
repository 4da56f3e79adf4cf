//! API Module
//!
//! HTTP handlers and routing for the proxy.
//!
//! # Endpoints
//! - `POST /clear-response-cache` - Flush the response cache
//! - `GET /cache-status` - Inspect cached entries and statistics
//! - `GET /health` - Health check endpoint
//! - everything else - Forwarded to the backend through the response cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
