//! Request, payload and response models for the route planning API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies, plus the
//! heterogeneous route payload shapes returned by the routing backend.

pub mod requests;
pub mod responses;
pub mod route;

// Re-export commonly used types
pub use requests::{DepartureTime, RouteMode, RouteRequest, TrafficModel, MAX_WAYPOINT_LENGTH};
pub use responses::{
    ClearCacheResponse, ErrorResponse, HealthResponse, PlanRouteResponse, StatsResponse,
};
pub use route::{
    LatLng, OverviewPolyline, ProviderDirections, ProviderRoute, RouteLeg, RoutePayload,
    RouteStep, StepPolyline, Stop, TextValue,
};
