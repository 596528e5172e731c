//! Cache-first serving of shell assets

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_root))
        .route("/{*path}", get(fetch_path))
}

/// GET /
async fn fetch_root(State(state): State<AppState>) -> Result<Response, AppError> {
    respond(&state, "/").await
}

/// GET /*path
async fn fetch_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    respond(&state, &format!("/{path}")).await
}

async fn respond(state: &AppState, key: &str) -> Result<Response, AppError> {
    let response = match state.worker.handle_fetch(key).await? {
        Some(body) => ([(header::CONTENT_TYPE, content_type(key))], body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    };
    Ok(response)
}

fn content_type(key: &str) -> &'static str {
    let extension = key.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("html");
    match extension {
        "html" => "text/html; charset=utf-8",
        "json" => "application/json",
        "webmanifest" => "application/manifest+json",
        "js" => "text/javascript",
        "css" => "text/css",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}
