//! HTTP Tests
//!
//! Drive the router in-process and check status codes and bodies for
//! upload, download, list and health.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use objectvault::http::HttpServer;
use objectvault::{Config, StorageEngine};
use tempfile::TempDir;
use tower::util::ServiceExt;

// =============================================================================
// Helper Functions
// =============================================================================

fn base_config(temp_dir: &TempDir) -> objectvault::config::ConfigBuilder {
    Config::builder()
        .storage_dir(temp_dir.path().join("storage"))
        .compression_level(3)
}

fn app_with(config: Config, start: bool) -> (Arc<StorageEngine>, Router) {
    let engine = if start {
        StorageEngine::open(config.clone()).unwrap()
    } else {
        StorageEngine::new(config.clone()).unwrap()
    };
    let engine = Arc::new(engine);
    let router = HttpServer::new(config, Arc::clone(&engine)).router();
    (engine, router)
}

fn setup_app() -> (TempDir, Arc<StorageEngine>, Router) {
    let temp_dir = TempDir::new().unwrap();
    let (engine, router) = app_with(base_config(&temp_dir).build(), true);
    (temp_dir, engine, router)
}

fn upload(key: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/upload/{key}"))
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

// =============================================================================
// Upload / Download Tests
// =============================================================================

#[tokio::test]
async fn test_upload_then_download() {
    let (_temp, _engine, app) = setup_app();

    let (status, body) = send(&app, upload("greeting.txt", "hello over http")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "object greeting.txt saved");

    let response = app.clone().oneshot(get("/download/greeting.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/octet-stream"
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"hello over http");
}

#[tokio::test]
async fn test_upload_binary_and_empty_bodies() {
    let (_temp, _engine, app) = setup_app();
    let binary: Vec<u8> = (0..=255u8).collect();

    assert_eq!(send(&app, upload("bin", binary.clone())).await.0, StatusCode::OK);
    assert_eq!(send(&app, upload("empty", Body::empty())).await.0, StatusCode::OK);

    assert_eq!(send(&app, get("/download/bin")).await.1, binary);
    assert_eq!(send(&app, get("/download/empty")).await, (StatusCode::OK, Vec::new()));
}

#[tokio::test]
async fn test_download_missing_is_404() {
    let (_temp, _engine, app) = setup_app();

    let (status, _) = send(&app, get("/download/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_key_is_400() {
    let (_temp, engine, app) = setup_app();

    // %2F decodes to '/', which makes the key a path
    assert_eq!(send(&app, upload("a%2Fb", "x")).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(send(&app, upload("%2E%2E", "x")).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(send(&app, get("/download/%2E%2E")).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(engine.cached_entry_count(), 0);
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let temp_dir = TempDir::new().unwrap();
    let (engine, app) = app_with(base_config(&temp_dir).max_body_bytes(16).build(), true);

    let (status, _) = send(&app, upload("big", vec![0u8; 64])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(engine.list().unwrap().is_empty());
}

// =============================================================================
// List / Health Tests
// =============================================================================

#[tokio::test]
async fn test_list_returns_json_array() {
    let (_temp, _engine, app) = setup_app();

    let (status, body) = send(&app, get("/list")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Vec<String>>(&body).unwrap(), Vec::<String>::new());

    send(&app, upload("b", "2")).await;
    send(&app, upload("a", "1")).await;

    let (_, body) = send(&app, get("/list")).await;
    assert_eq!(serde_json::from_slice::<Vec<String>>(&body).unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_health_reports_ready() {
    let (_temp, _engine, app) = setup_app();
    send(&app, upload("k", "v")).await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["ready"], true);
    assert_eq!(health["stats"]["saves"], 1);
}

// =============================================================================
// Availability Tests
// =============================================================================

#[tokio::test]
async fn test_not_ready_engine_is_503() {
    let temp_dir = TempDir::new().unwrap();
    let (_engine, app) = app_with(base_config(&temp_dir).build(), false);

    assert_eq!(send(&app, upload("k", "v")).await.0, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(send(&app, get("/download/k")).await.0, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(send(&app, get("/list")).await.0, StatusCode::SERVICE_UNAVAILABLE);

    let (_, body) = send(&app, get("/health")).await;
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["ready"], false);
}

#[tokio::test]
async fn test_full_queue_is_503() {
    let temp_dir = TempDir::new().unwrap();
    let config = base_config(&temp_dir)
        .queue_capacity(1)
        .enqueue_timeout(Duration::from_millis(50))
        .build();
    let (engine, app) = app_with(config, true);

    engine.pause_worker().unwrap();

    assert_eq!(send(&app, upload("first", "1")).await.0, StatusCode::OK);
    assert_eq!(send(&app, upload("second", "2")).await.0, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(send(&app, get("/download/second")).await.0, StatusCode::NOT_FOUND);

    engine.resume_worker().unwrap();
}
