//! Health check endpoint handlers.
//!
//! Provides health endpoints for monitoring and load balancers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use medqr_persistence::core::Storage;
use tracing::{debug, warn};

use crate::error::RestResult;
use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET /health`
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: Storage + 'static,
{
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "backend": state.storage().backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    Ok((StatusCode::OK, Json(health_response)).into_response())
}

/// Handler for a liveness probe.
///
/// # HTTP Request
///
/// `GET /_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Handler for a readiness probe. Pings the database.
///
/// # HTTP Request
///
/// `GET /_readiness`
///
/// # Response
///
/// - `200 OK` - Storage answered
/// - `503 Service Unavailable` - Storage did not answer
pub async fn readiness_handler<S>(State(state): State<AppState<S>>) -> Response
where
    S: Storage + 'static,
{
    debug!("Processing readiness check request");

    let backend_name = state.storage().backend_name();
    match state.storage().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "backend": backend_name,
                "checks": {"storage": "ok"}
            })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unavailable",
                    "backend": backend_name,
                    "checks": {"storage": "failed"}
                })),
            )
                .into_response()
        }
    }
}
