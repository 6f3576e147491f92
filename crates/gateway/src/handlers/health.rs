//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    pub manuscripts: usize,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: scholarflow_common::VERSION.to_string(),
    })
}

/// Readiness probe - reports store state
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let manuscripts = state.store.list().await.len();

    Json(ReadyResponse {
        status: "ready".to_string(),
        checks: HealthChecks {
            store: CheckResult {
                status: "up".to_string(),
                manuscripts,
            },
        },
    })
}
