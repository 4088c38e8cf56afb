//! Route payload shapes returned by the routing backend
//!
//! The backend response is heterogeneous: any subset of stops, a
//! provider-native directions object, and encoded polylines may be present.
//! Every field is optional at the wire level; the render pipeline decides
//! which geometry source to trust.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

// == Coordinates ==
/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

// == Stop ==
/// A single stop along the planned route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stop {
    /// Marker label, `A`, `B`, ... Assigned positionally when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Stop role: `origin`, `waypoint` or `destination`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

impl Stop {
    /// Returns the stop position when both coordinates are present and finite.
    pub fn coordinates(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(LatLng { lat, lng })
            }
            _ => None,
        }
    }
}

// == Provider Directions ==
/// Text-plus-value pair as emitted by the directions provider,
/// e.g. `{"text": "12.3 km", "value": 12300}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// A maneuver-level segment within a leg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteStep {
    /// Fine-grained point sequence, when the provider inlines one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<LatLng>>,
    /// Encoded geometry for this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<StepPolyline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_instructions: Option<String>,
}

/// Encoded step geometry wrapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepPolyline {
    #[serde(default)]
    pub points: String,
}

/// The portion of a route between two consecutive stops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteLeg {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<RouteStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_traffic: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<TextValue>,
}

/// Overview geometry, either a bare encoded string or a `{points}` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverviewPolyline {
    Encoded(String),
    Wrapped { points: String },
}

impl OverviewPolyline {
    /// The encoded polyline string regardless of wrapping.
    pub fn points(&self) -> &str {
        match self {
            OverviewPolyline::Encoded(s) => s,
            OverviewPolyline::Wrapped { points } => points,
        }
    }
}

/// A single provider route alternative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderRoute {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legs: Vec<RouteLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview_polyline: Option<OverviewPolyline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// The provider-native multi-route directions object, passed through to
/// the renderer untouched by strategy 3.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderDirections {
    #[serde(default)]
    pub routes: Vec<ProviderRoute>,
}

impl ProviderDirections {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn first_legs(&self) -> &[RouteLeg] {
        self.routes.first().map(|r| r.legs.as_slice()).unwrap_or(&[])
    }

    /// Sum of leg distances in meters over the first route.
    pub fn total_distance_meters(&self) -> f64 {
        self.first_legs()
            .iter()
            .filter_map(|leg| leg.distance.as_ref().and_then(|d| d.value))
            .sum()
    }

    /// Sum of leg durations in seconds over the first route.
    pub fn total_duration_seconds(&self) -> f64 {
        self.first_legs()
            .iter()
            .filter_map(|leg| leg.duration.as_ref().and_then(|d| d.value))
            .sum()
    }

    /// Sum of traffic-aware leg durations, falling back to the plain
    /// duration when the provider returned no traffic data.
    pub fn duration_in_traffic_seconds(&self) -> f64 {
        let with_traffic: f64 = self
            .first_legs()
            .iter()
            .filter_map(|leg| leg.duration_in_traffic.as_ref().and_then(|d| d.value))
            .sum();
        if with_traffic > 0.0 {
            with_traffic
        } else {
            self.total_duration_seconds()
        }
    }

    /// Whether any step instruction mentions a toll.
    pub fn has_tolls(&self) -> bool {
        self.first_legs().iter().any(|leg| {
            leg.steps.iter().any(|step| {
                step.html_instructions
                    .as_deref()
                    .map(|text| text.to_lowercase().contains("toll"))
                    .unwrap_or(false)
            })
        })
    }
}

// == Route Payload ==
/// Union of possible backend response shapes.
///
/// At least one renderable geometry source should exist, but the pipeline
/// tolerates none (markers-only render).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutePayload {
    /// Upstream error message; error payloads are never cached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stops: Vec<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directions: Option<ProviderDirections>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview_polyline: Option<OverviewPolyline>,
    /// Total route distance in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<f64>,
    /// Total route duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
    /// Traffic-aware duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_traffic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolls: Option<bool>,
    /// Estimated arrival, `YYYY-MM-DD HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
}

impl RoutePayload {
    /// Whether this payload signals an upstream error condition.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Locates an encoded overview polyline, searching in order: the
    /// top-level `polyline` string, the top-level `overview_polyline`
    /// (either wire form), then the first route inside `directions`.
    pub fn find_polyline(&self) -> Option<&str> {
        if let Some(polyline) = self.polyline.as_deref() {
            return Some(polyline);
        }
        if let Some(overview) = &self.overview_polyline {
            return Some(overview.points());
        }
        self.directions
            .as_ref()
            .and_then(|d| d.routes.first())
            .and_then(|route| route.overview_polyline.as_ref())
            .map(|overview| overview.points())
    }

    /// Fills in missing summary fields (totals, traffic duration, tolls,
    /// ETA) from the directions legs. Fields the backend already set are
    /// left untouched.
    pub fn ensure_summary(&mut self, departure_epoch: Option<i64>) {
        let Some(directions) = self.directions.as_ref() else {
            return;
        };
        if directions.is_empty() {
            return;
        }

        if self.total_distance.is_none() {
            let meters = directions.total_distance_meters();
            if meters > 0.0 {
                self.total_distance = Some(meters);
            }
        }
        if self.total_duration.is_none() {
            let seconds = directions.total_duration_seconds();
            if seconds > 0.0 {
                self.total_duration = Some(seconds);
            }
        }
        if self.duration_in_traffic.is_none() {
            let seconds = directions.duration_in_traffic_seconds();
            if seconds > 0.0 {
                self.duration_in_traffic = Some(seconds);
            }
        }
        if self.tolls.is_none() {
            self.tolls = Some(directions.has_tolls());
        }
        if self.eta.is_none() {
            if let (Some(departure), Some(duration)) = (departure_epoch, self.total_duration) {
                if let Some(eta) = Utc.timestamp_opt(departure + duration as i64, 0).single() {
                    self.eta = Some(eta.format("%Y-%m-%d %H:%M").to_string());
                }
            }
        }
    }
}
