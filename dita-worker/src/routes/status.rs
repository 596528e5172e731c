//! Worker status, also used as the CLI's health check

use axum::{Json, Router, extract::State, routing::get};
use dita_core::protocol::WorkerStatus;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(status))
}

/// GET /status
async fn status(State(state): State<AppState>) -> Json<WorkerStatus> {
    Json(state.worker.status())
}
