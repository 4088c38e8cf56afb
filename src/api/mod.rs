//! API Module
//!
//! HTTP handlers and routing for the route planning REST API.
//!
//! # Endpoints
//! - `POST /route` - Plan and render a multi-stop route
//! - `DELETE /cache` - Clear all cached routes
//! - `GET /cache/stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
