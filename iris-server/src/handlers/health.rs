//! Health check handlers
//!
//! Provides health and readiness endpoints for monitoring and orchestration.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    #[schema(example = "healthy")]
    pub status: &'static str,
    /// Server version from Cargo.toml
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// Service name
    #[schema(example = "iris-server")]
    pub service: &'static str,
}

/// Liveness check
///
/// Returns JSON with service status and version.
/// Used for monitoring and load balancer health checks.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "iris-server",
    })
}

/// Readiness response
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether the service is ready to accept traffic
    pub ready: bool,
    /// Optional message explaining status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Readiness check
///
/// Ready once the upload directory exists and, when SQLite backs the
/// history, the database answers.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Ready to accept traffic", body = ReadyResponse),
        (status = 503, description = "A dependency is unavailable", body = ReadyResponse)
    )
)]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    if !tokio::fs::try_exists(state.service.upload_dir())
        .await
        .unwrap_or(false)
    {
        return not_ready("upload directory missing");
    }

    if let Some(store) = &state.sqlite {
        if let Err(e) = store.check_health().await {
            tracing::warn!(error = %e, "Readiness check failed");
            return not_ready("database unavailable");
        }
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            message: None,
        }),
    )
}

fn not_ready(message: &'static str) -> (StatusCode, Json<ReadyResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ReadyResponse {
            ready: false,
            message: Some(message),
        }),
    )
}
