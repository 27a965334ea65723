//! Health check and scorer status

use axum::{extract::State, Json};
use behavioral_dna_core::ScorerStatus;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Current scoring strategy, model info and prediction counters
pub async fn scorer_status(State(state): State<AppState>) -> Json<ScorerStatus> {
    Json(state.scorer.status())
}
