//! Resolver Module
//!
//! Request validation, cache-first route resolution, and the transport
//! seam to the external routing backend.

pub mod service;
pub mod transport;

pub use service::{ResolvedRoute, RouteResolver};
pub use transport::{
    DirectionsQuery, DirectionsTransport, HttpDirectionsTransport, LocationRef, TransportRequest,
};
