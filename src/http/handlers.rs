//! Request handlers

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Json};
use serde::Serialize;

use crate::engine::EngineStatsSnapshot;
use crate::queue::CancelToken;

use super::error::ApiError;
use super::router::AppState;

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub version: &'static str,
    pub pending_writes: usize,
    pub stats: EngineStatsSnapshot,
}

/// `POST /upload/{key}`
///
/// The enqueue deadline is the configured per-request timeout; a full
/// queue that does not free up in time yields 503.
pub async fn upload(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<String, ApiError> {
    let engine = Arc::clone(&state.engine);
    let cancel = CancelToken::with_timeout(state.enqueue_timeout);
    let target = key.clone();

    tokio::task::spawn_blocking(move || engine.save(&target, &body, &cancel)).await??;

    Ok(format!("object {key} saved"))
}

/// `GET /download/{key}`
pub async fn download(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = Arc::clone(&state.engine);

    let data = tokio::task::spawn_blocking(move || engine.load(&key, &CancelToken::none())).await??;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data))
}

/// `GET /list`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.engine.list()?))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let ready = state.engine.is_ready();
    Json(HealthResponse {
        status: if ready { "ok" } else { "unavailable" },
        ready,
        version: crate::VERSION,
        pending_writes: state.engine.pending_writes(),
        stats: state.engine.stats(),
    })
}
