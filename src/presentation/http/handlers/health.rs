//! Health Check Handlers
//!
//! # Endpoints
//! - `GET /health` - Full report, always `200 OK`
//! - `GET /health/live` - Liveness probe (is the process running?)
//! - `GET /health/ready` - Full report, `503` when unhealthy

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::infrastructure::health::{run_health_checks, HealthReport, HealthStatus, HealthTargets};
use crate::startup::AppState;

/// Simple liveness response
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

async fn report(state: &AppState) -> HealthReport {
    run_health_checks(HealthTargets {
        pool: &state.db,
        cache: &*state.cache,
        registry: &state.registry,
        cache_ttl_seconds: state.settings.cache.health_ttl_seconds,
        environment: &state.settings.environment,
    })
    .await
}

/// Full health report
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(report(&state).await)
}

/// Liveness probe - checks if the server is running
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Readiness probe - 503 if any check is unhealthy
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = report(&state).await;
    (readiness_status(report.status), Json(report))
}

fn readiness_status(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}
