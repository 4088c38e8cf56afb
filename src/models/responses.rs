//! Response DTOs for the route planning API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::models::RoutePayload;
use crate::render::RenderPlan;

/// Response body for the route planning operation (POST /route)
#[derive(Debug, Clone, Serialize)]
pub struct PlanRouteResponse {
    /// The resolved route payload
    pub route: RoutePayload,
    /// Geometry and markers produced by the render pipeline
    pub render: RenderPlan,
    /// Whether the payload came from the cache
    pub cache_hit: bool,
}

/// Response body for the cache clear operation (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub cleared: usize,
}

impl ClearCacheResponse {
    /// Creates a new ClearCacheResponse
    pub fn new(cleared: usize) -> Self {
        Self {
            message: "Route cache cleared".to_string(),
            cleared,
        }
    }
}

/// Response body for the cache stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(hits: u64, misses: u64, evictions: u64, total_entries: usize) -> Self {
        let total_lookups = hits + misses;
        let hit_rate = if total_lookups > 0 {
            hits as f64 / total_lookups as f64
        } else {
            0.0
        };
        Self {
            hits,
            misses,
            evictions,
            total_entries,
            hit_rate,
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

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
