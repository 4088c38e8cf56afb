//! Render Module
//!
//! Converts resolved route payloads into renderable geometry and markers
//! through a deterministic multi-strategy fallback chain.

pub mod markers;
pub mod pipeline;

pub use markers::{build_markers, MarkerInfo, MarkerKind, RouteMarker};
pub use pipeline::{
    RenderOptions, RenderPipeline, RenderPlan, RenderStrategy, RouteGeometry, StrategyFailure,
};
