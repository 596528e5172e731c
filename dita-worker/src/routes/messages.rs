//! Messages from the foreground CLI

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use dita_core::protocol::WorkerMessage;
use tracing::debug;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/messages", post(post_message))
}

/// POST /messages - fire-and-forget, always 202 once parsed
async fn post_message(
    State(state): State<AppState>,
    Json(message): Json<WorkerMessage>,
) -> StatusCode {
    debug!(?message, "message received");
    state.worker.handle_message(message);
    StatusCode::ACCEPTED
}
