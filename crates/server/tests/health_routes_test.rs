//! Router tests for the identity and health endpoints.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use common::{MemoryStore, app_with, get, send, test_config};
use signup_hook_server::db::PgUserStore;
use signup_hook_server::routes;
use signup_hook_server::state::AppState;

#[tokio::test]
async fn root_reports_service_identity() {
    let app = app_with(Arc::new(MemoryStore::default()));

    let (status, body) = send(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Test Hook is running");
    assert_eq!(body["status"], "running");
    assert_eq!(body["service"], "signup-hook-server");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_is_healthy_when_store_reachable() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert!(body["response_time_ms"].is_u64());
    assert_eq!(store.calls(), 0, "health check must not write");
}

#[tokio::test]
async fn health_is_unavailable_when_store_down() {
    let store = Arc::new(MemoryStore::default());
    store.take_down();
    let app = app_with(store);

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn health_against_non_listening_database_is_bounded() {
    let mut config = test_config();
    config.database.host = "127.0.0.1".to_string();
    config.database.port = 9;
    config.database.acquire_timeout = Duration::from_secs(1);
    config.database.ping_timeout = Duration::from_secs(2);

    let store = PgUserStore::connect_lazy(&config.database);
    let app = routes::router(AppState::new(config, store));

    let started = Instant::now();
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "disconnected");
    assert!(started.elapsed() < Duration::from_secs(5));
}
