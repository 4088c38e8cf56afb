//! Route Markers Module
//!
//! Derives stop markers and their info content from a route payload.
//! Marker placement is independent of whichever geometry strategy wins and
//! runs exactly once per render call.

use serde::Serialize;
use tracing::debug;

use crate::models::{LatLng, RoutePayload, Stop};

// == Marker Kind ==
/// Role of a marker along the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Origin,
    Destination,
    Waypoint,
}

impl MarkerKind {
    fn title(&self) -> &'static str {
        match self {
            MarkerKind::Origin => "Origin",
            MarkerKind::Destination => "Destination",
            MarkerKind::Waypoint => "Waypoint",
        }
    }
}

// == Marker Info ==
/// Human-readable info content attached to a marker.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarkerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival: Option<String>,
}

// == Route Marker ==
/// A labeled marker at a stop position.
#[derive(Debug, Clone, Serialize)]
pub struct RouteMarker {
    /// Letter label: `A` for the origin, onwards in stop order
    pub label: char,
    pub kind: MarkerKind,
    pub position: LatLng,
    pub title: String,
    pub info: MarkerInfo,
}

// == Marker Derivation ==
/// Builds markers for a payload.
///
/// Prefers the payload's stops; stops without coordinates are skipped.
/// When no stop carries coordinates, falls back to the leg endpoints
/// inside the directions object. Returns an empty list when neither
/// source yields a position.
pub fn build_markers(payload: &RoutePayload) -> Vec<RouteMarker> {
    let stop_count = payload.stops.len();
    let mut markers = Vec::new();

    for (index, stop) in payload.stops.iter().enumerate() {
        let Some(position) = stop.coordinates() else {
            debug!(index, "Skipping stop without coordinates");
            continue;
        };

        let kind = stop_kind(stop, index, stop_count);
        let title = stop
            .address
            .clone()
            .unwrap_or_else(|| kind.title().to_string());

        markers.push(RouteMarker {
            label: stop.label.unwrap_or_else(|| letter(index)),
            kind,
            position,
            title,
            info: MarkerInfo {
                address: stop.address.clone(),
                distance: stop.distance_meters.map(format_distance),
                duration: stop.duration_seconds.map(format_duration),
                arrival: stop.arrival_time.clone(),
            },
        });
    }

    if !markers.is_empty() {
        return markers;
    }

    // No stop carried coordinates; derive endpoints from the legs instead.
    let legs = payload
        .directions
        .as_ref()
        .and_then(|d| d.routes.first())
        .map(|route| route.legs.as_slice())
        .unwrap_or(&[]);
    if legs.is_empty() {
        return markers;
    }

    if let Some(position) = legs[0].start_location {
        markers.push(RouteMarker {
            label: 'A',
            kind: MarkerKind::Origin,
            position,
            title: legs[0]
                .start_address
                .clone()
                .unwrap_or_else(|| "Origin".to_string()),
            info: MarkerInfo {
                address: legs[0].start_address.clone(),
                ..Default::default()
            },
        });
    }

    for (index, leg) in legs.iter().enumerate() {
        let Some(position) = leg.end_location else {
            continue;
        };
        let is_last = index == legs.len() - 1;
        let kind = if is_last {
            MarkerKind::Destination
        } else {
            MarkerKind::Waypoint
        };
        markers.push(RouteMarker {
            label: letter(index + 1),
            kind,
            position,
            title: leg
                .end_address
                .clone()
                .unwrap_or_else(|| kind.title().to_string()),
            info: MarkerInfo {
                address: leg.end_address.clone(),
                ..Default::default()
            },
        });
    }

    markers
}

/// Resolves a stop's marker kind from its declared role, falling back to
/// its position in the stop sequence.
fn stop_kind(stop: &Stop, index: usize, stop_count: usize) -> MarkerKind {
    match stop.kind.as_deref() {
        Some("origin") => MarkerKind::Origin,
        Some("destination") => MarkerKind::Destination,
        Some("waypoint") => MarkerKind::Waypoint,
        _ if index == 0 => MarkerKind::Origin,
        _ if index == stop_count - 1 => MarkerKind::Destination,
        _ => MarkerKind::Waypoint,
    }
}

/// Letter label for a stop index: A, B, C, ... wrapping after Z.
fn letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

// == Formatting ==
/// Formats a distance in meters as a human-readable string.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Formats a duration in seconds as a human-readable string.
///
/// Durations under a minute round up to one minute so a short hop never
/// shows as zero.
pub fn format_duration(seconds: f64) -> String {
    let mut minutes = (seconds / 60.0).round() as i64;
    if minutes == 0 && seconds > 0.0 {
        minutes = 1;
    }

    let hours = minutes / 60;
    let remaining = minutes % 60;
    if hours > 0 {
        format!("{hours}h {remaining}m")
    } else {
        format!("{minutes}m")
    }
}
