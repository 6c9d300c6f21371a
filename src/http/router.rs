use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::engine::StorageEngine;

use super::handlers;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<StorageEngine>,
    /// Deadline for each upload's wait on the write queue
    pub enqueue_timeout: Duration,
}

impl AppState {
    pub fn new(engine: Arc<StorageEngine>, config: &Config) -> Self {
        Self {
            engine,
            enqueue_timeout: config.enqueue_timeout,
        }
    }
}

/// Build the axum router with all ObjectVault endpoints.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/upload/:key", post(handlers::upload))
        .route("/download/:key", get(handlers::download))
        .route("/list", get(handlers::list))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
