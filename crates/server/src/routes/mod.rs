//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                 - Service identity
//! GET  /health           - Liveness + record store connectivity
//! POST /cognito-webhook  - Registration event intake
//! POST /test-webhook     - Synthetic registration event
//! ```

pub mod health;
pub mod webhook;

use std::time::Duration;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::panic_response;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/cognito-webhook", post(webhook::cognito_webhook))
        .route("/test-webhook", post(webhook::test_webhook))
}

/// Build the complete application with its middleware stack.
///
/// Layers, innermost first: request ID, request tracing, panic recovery.
pub fn router(state: AppState) -> Router {
    routes()
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}
