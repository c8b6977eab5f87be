//! Shared fixtures for router tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use signup_hook_server::config::WebhookConfig;
use signup_hook_server::db::{CreateOutcome, StoreError, UserStore};
use signup_hook_server::models::{NewUser, UserRecord};
use signup_hook_server::routes;
use signup_hook_server::state::AppState;

/// In-memory record store with the same create-if-absent contract as
/// `PgUserStore`, plus call counters.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, UserRecord>>,
    calls: AtomicUsize,
    down: AtomicBool,
}

impl MemoryStore {
    pub fn rows(&self) -> Vec<UserRecord> {
        self.users
            .lock()
            .expect("store lock")
            .values()
            .cloned()
            .collect()
    }

    pub fn get(&self, provider_user_id: &str) -> Option<UserRecord> {
        self.users
            .lock()
            .expect("store lock")
            .get(provider_user_id)
            .cloned()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail as if the database went away.
    pub fn take_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_if_absent(&self, candidate: &NewUser) -> Result<CreateOutcome, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }

        let mut users = self.users.lock().expect("store lock");
        let now = Utc::now();

        if let Some(existing) = users.get_mut(candidate.provider_user_id.as_str()) {
            existing.updated_at = now;
            return Ok(CreateOutcome {
                created: false,
                record: existing.clone(),
            });
        }
        if let Some(existing) = users.values().find(|u| u.email == candidate.email) {
            return Ok(CreateOutcome {
                created: false,
                record: existing.clone(),
            });
        }

        let record = candidate.clone().into_record(now);
        users.insert(candidate.provider_user_id.to_string(), record.clone());
        Ok(CreateOutcome {
            created: true,
            record,
        })
    }

    async fn ping(&self) -> bool {
        !self.down.load(Ordering::SeqCst)
    }
}

pub fn test_config() -> WebhookConfig {
    WebhookConfig::from_lookup(|key| match key {
        "DB_USER" => Some("hook".to_string()),
        "DB_PASSWORD" => Some("test-password".to_string()),
        "APP_TITLE" => Some("Test Hook".to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn app_with(store: Arc<MemoryStore>) -> Router {
    routes::router(AppState::with_shared_store(test_config(), store))
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}
