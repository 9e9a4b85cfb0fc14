//! Health check handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check - is the server running?
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub whatsapp: ServiceStatus,
    /// Whether records are forwarded to a workflow engine URL
    pub forwarding: bool,
}

/// Status of the Cloud API connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub configured: bool,
    pub healthy: bool,
}

/// Readiness check - can outbound sends reach the Cloud API?
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let (configured, healthy) = match state.dispatch.as_ref() {
        Some(dispatch) => (true, dispatch.is_available().await),
        None => (false, false),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            ready: healthy,
            whatsapp: ServiceStatus {
                configured,
                healthy,
            },
            forwarding: state.config.forward.url.is_some(),
        }),
    )
}
