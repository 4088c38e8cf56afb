//! Route Resolver Module
//!
//! Validates and normalizes a route request, then obtains a route payload
//! cache-first: a fresh cached response short-circuits the transport
//! entirely, otherwise the backend is called under a hard deadline and the
//! successful payload is cached for subsequent identical requests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::cache::RouteCache;
use crate::error::{Result, RouteError};
use crate::models::{DepartureTime, RoutePayload, RouteRequest, TrafficModel};
use crate::resolver::transport::{DirectionsTransport, TransportRequest};

// == Resolved Route ==
/// Outcome of a resolution, with its cache provenance.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub payload: RoutePayload,
    pub cache_hit: bool,
}

// == Route Resolver ==
/// Cache-first route resolution against an external directions transport.
pub struct RouteResolver {
    transport: Arc<dyn DirectionsTransport>,
    cache: Arc<RwLock<RouteCache>>,
    /// Hard deadline for a single transport call
    deadline: Duration,
}

impl RouteResolver {
    // == Constructor ==
    pub fn new(
        transport: Arc<dyn DirectionsTransport>,
        cache: Arc<RwLock<RouteCache>>,
        deadline: Duration,
    ) -> Self {
        Self {
            transport,
            cache,
            deadline,
        }
    }

    // == Resolve ==
    /// Resolves a request to a route payload.
    ///
    /// Steps:
    /// 1. Validate; invalid requests never reach the transport.
    /// 2. Default the departure time to now (traffic-aware resolution
    ///    needs a reference instant) and the traffic model to best-guess.
    /// 3. With `use_cache`, return a fresh cached payload immediately.
    /// 4. Otherwise call the transport under the deadline; the in-flight
    ///    request is cancelled when the deadline elapses.
    /// 5. A payload carrying an `error` field fails resolution and is
    ///    never cached; successful payloads are cached when `use_cache`.
    ///
    /// Concurrent identical requests are not deduplicated in flight; only
    /// completed responses are deduplicated by the cache.
    pub async fn resolve(&self, request: &RouteRequest, use_cache: bool) -> Result<ResolvedRoute> {
        if let Some(message) = request.validate() {
            return Err(RouteError::Validation(message));
        }

        let mut request = request.clone();
        if request.departure_time.is_none() {
            debug!("Defaulting departure time to now for traffic information");
            request.departure_time = Some(DepartureTime::Iso(Utc::now().to_rfc3339()));
        }
        if request.traffic_model.is_none() {
            request.traffic_model = Some(TrafficModel::BestGuess);
        }

        if use_cache {
            if let Some(payload) = self.cache.write().await.get(&request) {
                info!("Using cached route");
                return Ok(ResolvedRoute {
                    payload,
                    cache_hit: true,
                });
            }
        }

        let wire_request = TransportRequest::from_route_request(&request);
        info!(start = %wire_request.start, end = %wire_request.end, "Requesting route from backend");

        let mut payload = match timeout(self.deadline, self.transport.plan_route(&wire_request)).await
        {
            Ok(outcome) => outcome?,
            Err(_) => return Err(RouteError::Timeout(self.deadline.as_secs())),
        };

        if let Some(message) = payload.error.clone() {
            return Err(RouteError::Provider(message));
        }

        let departure_epoch = request
            .departure_time
            .as_ref()
            .and_then(|departure| departure.epoch_seconds());
        payload.ensure_summary(departure_epoch);

        if use_cache {
            self.cache.write().await.put(&request, payload.clone());
        }

        Ok(ResolvedRoute {
            payload,
            cache_hit: false,
        })
    }
}
