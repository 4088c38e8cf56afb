//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint over a mock
//! directions transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt;

use route_planner::api::create_router;
use route_planner::error::{Result, RouteError};
use route_planner::models::{ProviderDirections, RoutePayload, Stop};
use route_planner::resolver::{DirectionsQuery, DirectionsTransport, TransportRequest};
use route_planner::{AppState, Config};

// == Helper Functions ==

/// Transport fake returning a fixed payload, with call counting.
struct MockTransport {
    payload: RoutePayload,
    plan_calls: AtomicUsize,
}

impl MockTransport {
    fn returning(payload: RoutePayload) -> Arc<Self> {
        Arc::new(Self {
            payload,
            plan_calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectionsTransport for MockTransport {
    async fn plan_route(&self, _request: &TransportRequest) -> Result<RoutePayload> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }

    async fn query_directions(&self, _query: &DirectionsQuery) -> Result<ProviderDirections> {
        Err(RouteError::Provider("no live directions".to_string()))
    }
}

fn located_stop(lat: f64, lng: f64, address: &str) -> Stop {
    Stop {
        lat: Some(lat),
        lng: Some(lng),
        address: Some(address.to_string()),
        ..Default::default()
    }
}

fn stops_payload() -> RoutePayload {
    RoutePayload {
        stops: vec![
            located_stop(50.08, 14.43, "Prague"),
            located_stop(49.19, 16.61, "Brno"),
        ],
        total_distance: Some(205_000.0),
        ..Default::default()
    }
}

fn app_with(transport: Arc<MockTransport>) -> Router {
    let state = AppState::new(transport, &Config::default());
    create_router(state)
}

/// Request body with a pinned departure time so repeats share a cache key.
const ROUTE_BODY: &str = r#"{
    "start": "Prague",
    "end": "Brno",
    "waypoints": ["Jihlava"],
    "departure_time": "2025-06-01T08:00:00Z"
}"#;

fn route_request(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == Route Endpoint Tests ==

#[tokio::test]
async fn test_route_endpoint_success() {
    let transport = MockTransport::returning(stops_payload());
    let app = app_with(transport);

    let response = app
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cache_hit"], false);
    assert_eq!(json["route"]["total_distance"], 205_000.0);
    // Stops-only payload renders through the straight-segment fallback.
    assert_eq!(json["render"]["geometry"]["kind"], "path");
    assert_eq!(
        json["render"]["geometry"]["strategy"],
        "polyline_fallback"
    );
    assert_eq!(json["render"]["markers"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_route_endpoint_repeat_hits_cache() {
    let transport = MockTransport::returning(stops_payload());
    let app = app_with(transport.clone());

    let first = app
        .clone()
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(transport.calls(), 1);

    let second = app
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let json = body_to_json(second.into_body()).await;
    assert_eq!(json["cache_hit"], true);
    // The transport was not consulted again.
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_route_endpoint_cache_bypass() {
    let transport = MockTransport::returning(stops_payload());
    let app = app_with(transport.clone());

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(route_request("/route?cache=false", ROUTE_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_route_endpoint_rejects_blank_origin() {
    let transport = MockTransport::returning(stops_payload());
    let app = app_with(transport.clone());

    let response = app
        .oneshot(route_request(
            "/route",
            r#"{"start": "   ", "end": "Brno"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("Origin"));
    // Invalid requests never reach the transport.
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_route_endpoint_rejects_invalid_json() {
    let transport = MockTransport::returning(stops_payload());
    let app = app_with(transport);

    let response = app
        .oneshot(route_request("/route", r#"{"start": "Prague""#))
        .await
        .unwrap();

    // Axum returns 400 or 422 for JSON parsing errors
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_route_endpoint_surfaces_provider_error() {
    let transport = MockTransport::returning(RoutePayload {
        error: Some("No route found".to_string()),
        ..Default::default()
    });
    let app = app_with(transport.clone());

    let response = app
        .clone()
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("No route found"));

    // Error payloads are never cached: a retry calls the transport again.
    let _ = app
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_route_endpoint_renders_markers_without_geometry() {
    // A payload with a single located stop: every strategy fails, but the
    // response still carries the marker.
    let transport = MockTransport::returning(RoutePayload {
        stops: vec![located_stop(50.08, 14.43, "Prague")],
        ..Default::default()
    });
    let app = app_with(transport);

    let response = app
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["render"]["geometry"].is_null());
    assert_eq!(json["render"]["markers"].as_array().unwrap().len(), 1);
    assert_eq!(json["render"]["failures"].as_array().unwrap().len(), 4);
}

// == Cache Endpoint Tests ==

#[tokio::test]
async fn test_clear_cache_endpoint_forces_refetch() {
    let transport = MockTransport::returning(stops_payload());
    let app = app_with(transport.clone());

    // Populate the cache
    let _ = app
        .clone()
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();
    assert_eq!(transport.calls(), 1);

    // Clear it
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cleared"], 1);

    // The next identical request reaches the transport again
    let _ = app
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_stats_endpoint_tracks_lookups() {
    let transport = MockTransport::returning(stops_payload());
    let app = app_with(transport);

    // Miss (cold cache), then hit
    let _ = app
        .clone()
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();
    let _ = app
        .clone()
        .oneshot(route_request("/route", ROUTE_BODY))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert!(json.get("hit_rate").is_some());
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let transport = MockTransport::returning(stops_payload());
    let app = app_with(transport);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
