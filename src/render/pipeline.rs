//! Render Pipeline Module
//!
//! Converts a heterogeneous route payload into renderable geometry by
//! trying four strategies in strict priority order. Every strategy is a
//! uniform async step returning either geometry or a failure; the pipeline
//! awaits each in sequence and commits on the first success, so even the
//! live-query strategy can fall through to the remaining ones when it
//! fails. Strategy failures are swallowed and logged, never surfaced:
//! fallthrough is the designed recovery path.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{LatLng, ProviderDirections, RoutePayload, Stop, TrafficModel};
use crate::polyline;
use crate::render::markers::{build_markers, RouteMarker};
use crate::resolver::transport::{DirectionsQuery, DirectionsTransport, LocationRef};

// == Render Strategy ==
/// The four geometry strategies, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Per-step geometry concatenated across all routes, legs and steps
    DetailedPath,
    /// Fresh traffic-aware directions query over the payload's stops
    LiveQuery,
    /// The payload's own directions object, handed over undecoded
    BackendDirections,
    /// Overview polyline, else straight segments between stops
    PolylineFallback,
}

impl RenderStrategy {
    const ALL: [RenderStrategy; 4] = [
        RenderStrategy::DetailedPath,
        RenderStrategy::LiveQuery,
        RenderStrategy::BackendDirections,
        RenderStrategy::PolylineFallback,
    ];
}

// == Route Geometry ==
/// Geometry committed by a winning strategy.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteGeometry {
    /// A concrete coordinate path
    Path {
        strategy: RenderStrategy,
        points: Vec<LatLng>,
    },
    /// A provider directions object for the renderer to draw natively
    Directions {
        strategy: RenderStrategy,
        directions: ProviderDirections,
    },
}

impl RouteGeometry {
    pub fn strategy(&self) -> RenderStrategy {
        match self {
            RouteGeometry::Path { strategy, .. } => *strategy,
            RouteGeometry::Directions { strategy, .. } => *strategy,
        }
    }

    /// Number of explicit path points (zero for native directions).
    pub fn point_count(&self) -> usize {
        match self {
            RouteGeometry::Path { points, .. } => points.len(),
            RouteGeometry::Directions { .. } => 0,
        }
    }
}

// == Strategy Failure ==
/// A swallowed strategy failure, reported in the plan for observability.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyFailure {
    pub strategy: RenderStrategy,
    pub reason: String,
}

// == Render Plan ==
/// Outcome of a render call: geometry (when any strategy succeeded),
/// markers, and the failures encountered on the way.
#[derive(Debug, Clone, Serialize)]
pub struct RenderPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<RouteGeometry>,
    pub markers: Vec<RouteMarker>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StrategyFailure>,
}

impl RenderPlan {
    /// True when every strategy was exhausted and only markers remain.
    pub fn failed(&self) -> bool {
        self.geometry.is_none()
    }
}

// == Render Options ==
/// Per-request rendering context.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Highway avoidance forwarded to the live directions query
    pub avoid_highways: bool,
}

// == Render Pipeline ==
/// Strategy-chain renderer over a shared directions transport.
pub struct RenderPipeline {
    transport: Arc<dyn DirectionsTransport>,
}

impl RenderPipeline {
    // == Constructor ==
    pub fn new(transport: Arc<dyn DirectionsTransport>) -> Self {
        Self { transport }
    }

    // == Render ==
    /// Produces a render plan for a payload.
    ///
    /// Markers are derived once up front, independent of which geometry
    /// strategy wins. Strategies then run in priority order; the first
    /// success is committed. When all fail the plan carries markers only.
    pub async fn render(&self, payload: &RoutePayload, options: &RenderOptions) -> RenderPlan {
        let markers = build_markers(payload);
        let mut failures = Vec::new();

        for strategy in RenderStrategy::ALL {
            match self.try_strategy(strategy, payload, options).await {
                Ok(geometry) => {
                    info!(?strategy, points = geometry.point_count(), "Route geometry resolved");
                    return RenderPlan {
                        geometry: Some(geometry),
                        markers,
                        failures,
                    };
                }
                Err(failure) => {
                    debug!(
                        strategy = ?failure.strategy,
                        reason = %failure.reason,
                        "Render strategy failed, falling through"
                    );
                    failures.push(failure);
                }
            }
        }

        warn!("All rendering strategies failed; rendering markers only");
        RenderPlan {
            geometry: None,
            markers,
            failures,
        }
    }

    async fn try_strategy(
        &self,
        strategy: RenderStrategy,
        payload: &RoutePayload,
        options: &RenderOptions,
    ) -> Result<RouteGeometry, StrategyFailure> {
        match strategy {
            RenderStrategy::DetailedPath => self.detailed_path(payload),
            RenderStrategy::LiveQuery => self.live_query(payload, options).await,
            RenderStrategy::BackendDirections => self.backend_directions(payload),
            RenderStrategy::PolylineFallback => self.polyline_or_segments(payload),
        }
    }

    // == Strategy 1: Detailed Path ==
    /// Concatenates per-step geometry across all routes, legs and steps.
    fn detailed_path(&self, payload: &RoutePayload) -> Result<RouteGeometry, StrategyFailure> {
        let Some(directions) = payload.directions.as_ref() else {
            return Err(fail(
                RenderStrategy::DetailedPath,
                "payload carries no directions",
            ));
        };

        let points = steps_path(directions);
        if points.is_empty() {
            return Err(fail(
                RenderStrategy::DetailedPath,
                "directions contain no step geometry",
            ));
        }

        Ok(RouteGeometry::Path {
            strategy: RenderStrategy::DetailedPath,
            points,
        })
    }

    // == Strategy 2: Live Query ==
    /// Issues a fresh directions query over the payload's stops, preferring
    /// coordinates and falling back to addresses for each endpoint.
    async fn live_query(
        &self,
        payload: &RoutePayload,
        options: &RenderOptions,
    ) -> Result<RouteGeometry, StrategyFailure> {
        let stops = &payload.stops;
        if stops.len() < 2 {
            return Err(fail(
                RenderStrategy::LiveQuery,
                "payload carries fewer than two stops",
            ));
        }

        let origin = location_ref(&stops[0]).ok_or_else(|| {
            fail(
                RenderStrategy::LiveQuery,
                "origin stop has neither coordinates nor an address",
            )
        })?;
        let destination = location_ref(&stops[stops.len() - 1]).ok_or_else(|| {
            fail(
                RenderStrategy::LiveQuery,
                "destination stop has neither coordinates nor an address",
            )
        })?;
        let waypoints = stops[1..stops.len() - 1]
            .iter()
            .filter_map(location_ref)
            .collect();

        let query = DirectionsQuery {
            origin,
            destination,
            waypoints,
            avoid_highways: options.avoid_highways,
            departure_time: Utc::now().to_rfc3339(),
            traffic_model: TrafficModel::BestGuess,
        };

        let directions = self
            .transport
            .query_directions(&query)
            .await
            .map_err(|error| {
                fail(
                    RenderStrategy::LiveQuery,
                    format!("live directions query failed: {error}"),
                )
            })?;

        let mut points = steps_path(&directions);
        if points.is_empty() {
            if let Some(overview) = directions
                .routes
                .first()
                .and_then(|route| route.overview_polyline.as_ref())
            {
                points = polyline::decode(overview.points()).points;
            }
        }
        if points.is_empty() {
            return Err(fail(
                RenderStrategy::LiveQuery,
                "live directions contained no geometry",
            ));
        }

        Ok(RouteGeometry::Path {
            strategy: RenderStrategy::LiveQuery,
            points,
        })
    }

    // == Strategy 3: Backend Directions ==
    /// Hands the payload's own directions object to the renderer untouched.
    fn backend_directions(&self, payload: &RoutePayload) -> Result<RouteGeometry, StrategyFailure> {
        match payload.directions.as_ref() {
            Some(directions) if !directions.is_empty() => Ok(RouteGeometry::Directions {
                strategy: RenderStrategy::BackendDirections,
                directions: directions.clone(),
            }),
            _ => Err(fail(
                RenderStrategy::BackendDirections,
                "payload carries no renderable directions",
            )),
        }
    }

    // == Strategy 4: Polyline or Straight Segments ==
    /// Decodes the first overview polyline found; when none decodes to any
    /// points, draws straight segments between consecutive stops that
    /// carry coordinates.
    fn polyline_or_segments(&self, payload: &RoutePayload) -> Result<RouteGeometry, StrategyFailure> {
        if let Some(encoded) = payload.find_polyline() {
            let decoded = polyline::decode(encoded);
            if decoded.truncated {
                debug!("Overview polyline truncated; using decoded prefix");
            }
            if !decoded.points.is_empty() {
                return Ok(RouteGeometry::Path {
                    strategy: RenderStrategy::PolylineFallback,
                    points: decoded.points,
                });
            }
        }

        let points: Vec<LatLng> = payload
            .stops
            .iter()
            .filter_map(|stop| stop.coordinates())
            .collect();
        if points.len() >= 2 {
            debug!("Drawing straight segments between stops");
            return Ok(RouteGeometry::Path {
                strategy: RenderStrategy::PolylineFallback,
                points,
            });
        }

        Err(fail(
            RenderStrategy::PolylineFallback,
            "no decodable polyline and fewer than two stops carry coordinates",
        ))
    }
}

// == Helpers ==
fn fail(strategy: RenderStrategy, reason: impl Into<String>) -> StrategyFailure {
    StrategyFailure {
        strategy,
        reason: reason.into(),
    }
}

/// Concatenates step geometry across all routes, legs and steps, in order.
/// A step's own point sequence wins over its encoded polyline.
fn steps_path(directions: &ProviderDirections) -> Vec<LatLng> {
    let mut points = Vec::new();

    for route in &directions.routes {
        for leg in &route.legs {
            for step in &leg.steps {
                if let Some(path) = step.path.as_ref().filter(|path| !path.is_empty()) {
                    points.extend_from_slice(path);
                    continue;
                }
                if let Some(encoded) = step.polyline.as_ref() {
                    let decoded = polyline::decode(&encoded.points);
                    if decoded.truncated {
                        debug!("Step polyline truncated; using decoded prefix");
                    }
                    points.extend(decoded.points);
                }
            }
        }
    }

    points
}

/// A stop's location reference: coordinates when present, else its address.
fn location_ref(stop: &Stop) -> Option<LocationRef> {
    if let Some(position) = stop.coordinates() {
        return Some(LocationRef::Coordinates(position));
    }
    stop.address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(|address| LocationRef::Address(address.to_string()))
}
