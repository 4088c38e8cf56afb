//! API Handlers
//!
//! HTTP request handlers for each route planning endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::RouteCache;
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    ClearCacheResponse, HealthResponse, PlanRouteResponse, RouteRequest, StatsResponse,
};
use crate::render::{RenderOptions, RenderPipeline};
use crate::resolver::{DirectionsTransport, HttpDirectionsTransport, RouteResolver};

/// Application state shared across all handlers.
///
/// The cache is an explicit instance owned here and threaded through the
/// resolver's construction; there is no ambient singleton. The same
/// transport serves both the resolver and the render pipeline's live
/// directions queries.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe route cache
    pub cache: Arc<RwLock<RouteCache>>,
    /// Cache-first route resolver
    pub resolver: Arc<RouteResolver>,
    /// Fallback-chain renderer
    pub pipeline: Arc<RenderPipeline>,
}

impl AppState {
    /// Creates a new AppState over the given transport.
    pub fn new(transport: Arc<dyn DirectionsTransport>, config: &Config) -> Self {
        let cache = Arc::new(RwLock::new(RouteCache::new(
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl),
        )));
        let resolver = Arc::new(RouteResolver::new(
            transport.clone(),
            cache.clone(),
            Duration::from_secs(config.transport_timeout),
        ));
        let pipeline = Arc::new(RenderPipeline::new(transport));

        Self {
            cache,
            resolver,
            pipeline,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds an HTTP transport against the configured routing backend.
    pub fn from_config(config: &Config) -> Self {
        let transport: Arc<dyn DirectionsTransport> =
            Arc::new(HttpDirectionsTransport::new(&config.provider_base_url));
        Self::new(transport, config)
    }
}

/// Query parameters for POST /route
#[derive(Debug, Default, Deserialize)]
pub struct PlanRouteQuery {
    /// Set to false to bypass the cache (forces a fresh resolution)
    #[serde(default)]
    pub cache: Option<bool>,
}

/// Handler for POST /route
///
/// Validates and resolves the request (cache-first), then runs the render
/// pipeline over the payload. Render-strategy failures never fail the
/// request; a fully failed render still returns markers.
pub async fn plan_route_handler(
    State(state): State<AppState>,
    Query(query): Query<PlanRouteQuery>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<PlanRouteResponse>> {
    let use_cache = query.cache.unwrap_or(true);

    let resolved = state.resolver.resolve(&request, use_cache).await?;

    let options = RenderOptions {
        avoid_highways: !request.use_highways,
    };
    let render = state.pipeline.render(&resolved.payload, &options).await;

    Ok(Json(PlanRouteResponse {
        route: resolved.payload,
        render,
        cache_hit: resolved.cache_hit,
    }))
}

/// Handler for DELETE /cache
///
/// Removes all cached routes unconditionally.
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let cleared = state.cache.write().await.clear();
    info!(cleared, "Route cache cleared by user request");
    Json(ClearCacheResponse::new(cleared))
}

/// Handler for GET /cache/stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(StatsResponse::new(
        stats.hits,
        stats.misses,
        stats.evictions,
        stats.total_entries,
    ))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
