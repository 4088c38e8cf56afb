//! Request DTOs for the route planning API
//!
//! Defines the structure of incoming HTTP request bodies.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Maximum allowed waypoint length in characters
pub const MAX_WAYPOINT_LENGTH: usize = 500;

// == Route Mode ==
/// Optimization preference for the planned route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// Fastest route (the default)
    #[default]
    Time,
    /// Shortest total distance
    Distance,
    /// Shortest route allowing waypoint reordering
    Shortest,
}

// == Traffic Model ==
/// Traffic prediction model forwarded to the directions provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrafficModel {
    #[default]
    BestGuess,
    Pessimistic,
    Optimistic,
}

// == Departure Time ==
/// Departure instant, accepted either as a Unix timestamp or an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepartureTime {
    /// Unix timestamp in seconds
    Timestamp(i64),
    /// ISO-8601 date-time string
    Iso(String),
}

impl DepartureTime {
    /// Resolves the departure instant to Unix seconds.
    ///
    /// Returns None when the ISO string does not parse or the timestamp is
    /// outside the representable range.
    pub fn epoch_seconds(&self) -> Option<i64> {
        match self {
            DepartureTime::Timestamp(ts) => Utc.timestamp_opt(*ts, 0).single().map(|_| *ts),
            DepartureTime::Iso(s) => parse_iso(s).map(|dt| dt.timestamp()),
        }
    }

    /// Renders the departure instant as an ISO-8601 string for the wire.
    pub fn to_iso8601(&self) -> Option<String> {
        match self {
            DepartureTime::Timestamp(ts) => {
                Utc.timestamp_opt(*ts, 0).single().map(|dt| dt.to_rfc3339())
            }
            DepartureTime::Iso(s) => parse_iso(s).map(|_| s.clone()),
        }
    }
}

/// Parses an ISO-8601 date-time, accepting both offset-carrying (RFC 3339)
/// and naive forms. Naive times are interpreted as UTC.
fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

// == Route Request ==
/// Request body for the route planning operation (POST /route)
///
/// # Fields
/// - `origin`/`destination`: addresses, wire names `start`/`end`
/// - `waypoints`: ordered intermediate stops
/// - `use_highways`: allow highways (highway avoidance is the inverse)
/// - `mode`: optimization preference, defaults to `time`
/// - `departure_time`: optional departure instant for traffic awareness
/// - `traffic_model`: optional traffic prediction model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Origin address
    #[serde(rename = "start")]
    pub origin: String,
    /// Destination address
    #[serde(rename = "end")]
    pub destination: String,
    /// Ordered intermediate stops
    #[serde(default)]
    pub waypoints: Vec<String>,
    /// Whether highways may be used
    #[serde(default)]
    pub use_highways: bool,
    /// Route optimization mode
    #[serde(default)]
    pub mode: RouteMode,
    /// Optional departure instant
    #[serde(default)]
    pub departure_time: Option<DepartureTime>,
    /// Optional traffic prediction model
    #[serde(default)]
    pub traffic_model: Option<TrafficModel>,
}

impl RouteRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    /// Waypoint order is significant and is never checked for duplicates.
    pub fn validate(&self) -> Option<String> {
        if self.origin.trim().is_empty() {
            return Some("Origin is required and must be a non-empty string".to_string());
        }
        if self.destination.trim().is_empty() {
            return Some("Destination is required and must be a non-empty string".to_string());
        }
        for (index, waypoint) in self.waypoints.iter().enumerate() {
            if waypoint.trim().is_empty() {
                return Some(format!("Waypoint {} must be a non-empty string", index + 1));
            }
            if waypoint.chars().count() > MAX_WAYPOINT_LENGTH {
                return Some(format!(
                    "Waypoint {} exceeds maximum length of {} characters",
                    index + 1,
                    MAX_WAYPOINT_LENGTH
                ));
            }
        }
        if let Some(departure) = &self.departure_time {
            if departure.epoch_seconds().is_none() {
                return Some(
                    "Departure time must be an ISO-8601 string or timestamp".to_string(),
                );
            }
        }
        None
    }
}
