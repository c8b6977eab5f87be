//! Service identity and health endpoints.

use std::time::Instant;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::state::AppState;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Overall health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Database connectivity as seen by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: DatabaseStatus,
    pub timestamp: DateTime<Utc>,
    /// Round-trip time of the store probe
    pub response_time_ms: u64,
}

/// `GET /` - service identity. Does not check dependencies.
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: format!("{} is running", state.config().app_title),
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        timestamp: Utc::now(),
    })
}

/// `GET /health` - liveness plus record store connectivity.
///
/// Returns 503 Service Unavailable if the store probe fails or times out.
pub async fn health(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let reachable = state.store().ping().await;
    let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (status_code, status, database) = if reachable {
        debug!(response_time_ms, "Health check passed");
        (StatusCode::OK, HealthStatus::Healthy, DatabaseStatus::Connected)
    } else {
        warn!(response_time_ms, "Health check failed: store unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthStatus::Unhealthy,
            DatabaseStatus::Disconnected,
        )
    };

    let body = HealthResponse {
        status,
        database,
        timestamp: Utc::now(),
        response_time_ms,
    };
    (status_code, Json(body)).into_response()
}
