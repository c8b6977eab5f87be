//! Signup Hook - registration webhook receiver.
//!
//! Receives the identity provider's post-confirmation callback and records the
//! new user in `PostgreSQL`.
//!
//! # Lifecycle
//!
//! 1. Load configuration from the environment (and `.env`, if present)
//! 2. Initialize Sentry and tracing
//! 3. Connect the record store (fatal if the database is unreachable)
//! 4. Serve until Ctrl+C or SIGTERM, then drain requests and close the pool
//!
//! The `users` schema is NOT created on startup; apply
//! `crates/server/migrations/` to the database beforehand.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use signup_hook_server::config::WebhookConfig;
use signup_hook_server::db::PgUserStore;
use signup_hook_server::routes;
use signup_hook_server::state::AppState;
use signup_hook_server::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match WebhookConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().init();
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(&config.logging);

    let store = match PgUserStore::connect(&config.database).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(
                error = %e,
                host = %config.database.host,
                port = config.database.port,
                database = %config.database.name,
                "Failed to connect to database"
            );
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        host = %config.database.host,
        database = %config.database.name,
        "Database pool created"
    );

    let addr = config.socket_addr();
    let state = AppState::new(config, store.clone());

    let app = routes::router(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind to address");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("webhook receiver listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    tracing::info!("Database pool closed");

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
