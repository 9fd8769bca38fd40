//! Health Check Handlers
//!
//! Liveness and readiness checks.
//!
//! # Endpoints
//! - `GET /health` - Basic health check
//! - `GET /health/live` - Liveness check (is the server running?)
//! - `GET /health/ready` - Readiness check (can the document store be reached?)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::Instant;

use crate::startup::AppState;

/// Server start time for uptime calculation
static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);
static SERVER_START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Store round-trips slower than this report as degraded.
const DEGRADED_LATENCY_MS: u64 = 100;

/// Initialize the server start time (call during startup)
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
    Lazy::force(&SERVER_START_TIME);
}

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed health check response
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: HealthChecks,
}

/// Individual dependency checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub store: ServiceHealth,
}

/// Health status for individual services
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Simple liveness response
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness check - checks if the server is running
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Readiness check - 200 if the store answers, 503 otherwise
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let store = check_store(&state).await;
    let overall_status = store.status;

    let response = DetailedHealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: SERVER_START.elapsed().as_secs(),
        started_at: SERVER_START_TIME.to_rfc3339(),
        checks: HealthChecks { store },
    };

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Check store connectivity and latency
async fn check_store(state: &AppState) -> ServiceHealth {
    let start = Instant::now();
    let timeout = state.settings.database.query_timeout();

    match tokio::time::timeout(timeout, state.store.ping()).await {
        Ok(Ok(())) => {
            let latency = start.elapsed().as_millis() as u64;
            ServiceHealth {
                status: classify_latency(latency),
                latency_ms: Some(latency),
                message: None,
            }
        }
        Ok(Err(e)) => ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(format!("Store ping failed: {}", e)),
        },
        Err(_) => ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(format!("Store ping timed out after {:?}", timeout)),
        },
    }
}

fn classify_latency(latency_ms: u64) -> HealthStatus {
    if latency_ms < DEGRADED_LATENCY_MS {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    }
}
