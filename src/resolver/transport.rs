//! Directions Transport Module
//!
//! The seam between the resolver and the external routing backend. The
//! trait keeps the resolver and render pipeline testable with in-process
//! fakes; the reqwest-backed implementation talks JSON over HTTP.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, RouteError};
use crate::models::{
    LatLng, ProviderDirections, RouteMode, RoutePayload, RouteRequest, TrafficModel,
};

// == Transport Request ==
/// Wire body for a full route planning call.
#[derive(Debug, Clone, Serialize)]
pub struct TransportRequest {
    pub start: String,
    pub end: String,
    pub waypoints: Vec<String>,
    pub use_highways: bool,
    pub mode: RouteMode,
    /// ISO-8601 departure instant
    pub departure_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_model: Option<TrafficModel>,
}

impl TransportRequest {
    /// Builds the wire body from a validated, normalized request.
    ///
    /// String fields are trimmed; the departure time must already be
    /// present (the resolver defaults it before calling the transport).
    pub fn from_route_request(request: &RouteRequest) -> Self {
        let departure_time = request
            .departure_time
            .as_ref()
            .and_then(|departure| departure.to_iso8601())
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        Self {
            start: request.origin.trim().to_string(),
            end: request.destination.trim().to_string(),
            waypoints: request
                .waypoints
                .iter()
                .map(|wp| wp.trim().to_string())
                .collect(),
            use_highways: request.use_highways,
            mode: request.mode,
            departure_time,
            traffic_model: request.traffic_model,
        }
    }
}

// == Live Directions Query ==
/// A stop reference for a live directions query: coordinates when known,
/// the address otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LocationRef {
    Coordinates(LatLng),
    Address(String),
}

/// Wire body for a fresh directions lookup over already-resolved stops.
#[derive(Debug, Clone, Serialize)]
pub struct DirectionsQuery {
    pub origin: LocationRef,
    pub destination: LocationRef,
    pub waypoints: Vec<LocationRef>,
    pub avoid_highways: bool,
    /// ISO-8601 departure instant anchoring the traffic model
    pub departure_time: String,
    pub traffic_model: TrafficModel,
}

// == Transport Trait ==
/// Outbound interface to the routing backend.
#[async_trait]
pub trait DirectionsTransport: Send + Sync {
    /// Full route planning call: origin, destination and waypoints by address.
    async fn plan_route(&self, request: &TransportRequest) -> Result<RoutePayload>;

    /// Fresh directions lookup for already-resolved stops.
    async fn query_directions(&self, query: &DirectionsQuery) -> Result<ProviderDirections>;
}

// == HTTP Transport ==
/// reqwest-backed transport against the routing backend's JSON API.
pub struct HttpDirectionsTransport {
    client: Client,
    base_url: String,
}

impl HttpDirectionsTransport {
    /// Creates a transport with a connection timeout. The total request
    /// deadline is enforced by the caller, which cancels the in-flight
    /// call when it elapses.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DirectionsTransport for HttpDirectionsTransport {
    async fn plan_route(&self, request: &TransportRequest) -> Result<RoutePayload> {
        let endpoint = format!("{}/route", self.base_url);
        debug!(endpoint = %endpoint, "Sending route request");

        let response = self
            .client
            .post(&endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| RouteError::Provider(format!("Failed to reach routing backend: {e}")))?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        response
            .json::<RoutePayload>()
            .await
            .map_err(|e| RouteError::Provider(format!("Invalid response from routing backend: {e}")))
    }

    async fn query_directions(&self, query: &DirectionsQuery) -> Result<ProviderDirections> {
        let endpoint = format!("{}/directions", self.base_url);
        debug!(endpoint = %endpoint, "Sending live directions query");

        let response = self
            .client
            .post(&endpoint)
            .json(query)
            .send()
            .await
            .map_err(|e| RouteError::Provider(format!("Failed to reach routing backend: {e}")))?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let envelope = response
            .json::<DirectionsEnvelope>()
            .await
            .map_err(|e| RouteError::Provider(format!("Invalid response from routing backend: {e}")))?;

        if let Some(message) = envelope.error {
            return Err(RouteError::Provider(message));
        }
        envelope
            .directions
            .ok_or_else(|| RouteError::Provider("Response contained no directions".to_string()))
    }
}

/// Envelope for the directions endpoint: either an error or directions.
#[derive(Debug, Deserialize)]
struct DirectionsEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    directions: Option<ProviderDirections>,
}

/// Builds a ProviderError from a non-success response, preferring the
/// body's `error` field over the bare status line.
async fn provider_error(response: Response) -> RouteError {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        error: Option<String>,
    }

    let status = response.status();
    let fallback = format!(
        "Server returned {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error.unwrap_or(fallback),
        Err(_) => fallback,
    };
    RouteError::Provider(message)
}
