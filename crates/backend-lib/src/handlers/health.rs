//! Liveness endpoints.
use axum::{extract::State, Json};
use naan_common::HealthReport;

use crate::AppState;

/// `GET /`
pub async fn root() -> &'static str {
    "naan running"
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".to_string(),
        active_rooms: state.rooms.len(),
    })
}
