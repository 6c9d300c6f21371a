//! HTTP Module
//!
//! axum front end over a shared `StorageEngine`.
//!
//! ## Routes
//! - `POST /upload/{key}`  : body is the raw payload
//! - `GET  /download/{key}`: raw payload bytes
//! - `GET  /list`          : JSON array of known keys
//! - `GET  /health`        : readiness and counters
//!
//! Engine calls can block (full write queue), so handlers run them on the
//! blocking thread pool.

mod error;
mod handlers;
mod router;
mod server;

pub use error::ApiError;
pub use handlers::HealthResponse;
pub use router::{build_router, AppState};
pub use server::{shutdown_signal, HttpServer};
