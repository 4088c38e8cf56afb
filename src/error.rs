//! Error types for the route planning service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Route Error Enum ==
/// Unified error type for route resolution.
///
/// Render-strategy failures are deliberately NOT part of this enum: the
/// pipeline swallows them and falls through to the next strategy, so they
/// never surface as HTTP errors.
#[derive(Error, Debug)]
pub enum RouteError {
    /// Request failed validation and was never sent to the transport
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Transport call exceeded its deadline; the in-flight request was cancelled
    #[error("Route request timed out after {0}s")]
    Timeout(u64),

    /// Upstream provider returned an error status or an error field
    #[error("Provider error: {0}")]
    Provider(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = match &self {
            RouteError::Validation(_) => StatusCode::BAD_REQUEST,
            RouteError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RouteError::Provider(_) => StatusCode::BAD_GATEWAY,
            RouteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the route planning service.
pub type Result<T> = std::result::Result<T, RouteError>;
