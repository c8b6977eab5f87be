//! Router tests for the webhook intake endpoints.
//!
//! These run against an in-memory store, so they need no database.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{MemoryStore, app_with, post_json, send};

const SCENARIO_BODY: &str = r#"{"userId":"abc-123","email":"a@b.com","name":"A B"}"#;

#[tokio::test]
async fn creates_user_from_flat_event() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let (status, body) = send(&app, post_json("/cognito-webhook", SCENARIO_BODY)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["created"], true);
    assert_eq!(body["provider_user_id"], "abc-123");
    assert_eq!(body["email"], "a@b.com");

    let row = store.get("abc-123").expect("row stored");
    assert_eq!(row.email.as_str(), "a@b.com");
    assert_eq!(row.name.as_deref(), Some("A B"));
    assert_eq!(row.provider, "google");
    assert!(row.is_active);
    assert!(!row.onboarding_completed);
    assert_eq!(body["user_id"], row.id.to_string());
}

#[tokio::test]
async fn repeated_event_is_idempotent() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let (first_status, first) = send(&app, post_json("/cognito-webhook", SCENARIO_BODY)).await;
    let (second_status, second) = send(&app, post_json("/cognito-webhook", SCENARIO_BODY)).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second["created"], false);
    assert_eq!(second["message"], "User already exists");
    assert_eq!(first["user_id"], second["user_id"]);
    assert_eq!(store.rows().len(), 1);
}

#[tokio::test]
async fn duplicate_does_not_overwrite_identity_fields() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    send(&app, post_json("/cognito-webhook", SCENARIO_BODY)).await;
    let (status, _) = send(
        &app,
        post_json(
            "/cognito-webhook",
            r#"{"userId":"abc-123","email":"changed@b.com","name":"Someone Else"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let row = store.get("abc-123").expect("row stored");
    assert_eq!(row.email.as_str(), "a@b.com");
    assert_eq!(row.name.as_deref(), Some("A B"));
}

#[tokio::test]
async fn email_owned_by_another_user_is_acknowledged() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let (_, first) = send(
        &app,
        post_json("/cognito-webhook", r#"{"userId":"u1","email":"x@y.com"}"#),
    )
    .await;
    let (status, second) = send(
        &app,
        post_json("/cognito-webhook", r#"{"userId":"u2","email":"x@y.com"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["status"], "ok");
    assert_eq!(second["created"], false);
    assert_eq!(second["message"], "User already exists");
    assert_eq!(second["provider_user_id"], "u2");
    assert_eq!(second["user_id"], first["user_id"]);
    assert_eq!(second["email"], "x@y.com");

    assert_eq!(store.rows().len(), 1);
    assert!(store.get("u1").is_some());
    assert!(store.get("u2").is_none());
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn distinct_users_each_get_one_row() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    for i in 0..5 {
        let body = format!(r#"{{"userId":"user-{i}","email":"user{i}@example.com"}}"#);
        for _ in 0..2 {
            let (status, _) = send(&app, post_json("/cognito-webhook", &body)).await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    assert_eq!(store.rows().len(), 5);
    assert_eq!(store.calls(), 10);
}

#[tokio::test]
async fn cognito_envelope_is_accepted() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let body = r#"{
        "version": "1",
        "region": "us-east-1",
        "userPoolId": "us-east-1_abc",
        "userName": "google_1234",
        "callerContext": {"clientId": "client"},
        "triggerSource": "PostConfirmation_ConfirmSignUp",
        "request": {"userAttributes": {"email": "jane@example.com", "name": "Jane"}},
        "response": {}
    }"#;
    let (status, response) = send(&app, post_json("/cognito-webhook", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["provider_user_id"], "google_1234");
    assert!(store.get("google_1234").is_some());
}

#[tokio::test]
async fn other_trigger_sources_are_ignored() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let body = r#"{
        "userName": "google_1234",
        "triggerSource": "PostConfirmation_ConfirmForgotPassword",
        "request": {"userAttributes": {"email": "jane@example.com"}}
    }"#;
    let (status, response) = send(&app, post_json("/cognito-webhook", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "ignored");
    assert_eq!(response["trigger_source"], "PostConfirmation_ConfirmForgotPassword");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn missing_user_id_is_rejected_without_store_call() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let (status, body) = send(&app, post_json("/cognito-webhook", r#"{"email":"a@b.com"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_user_id");
    assert_eq!(store.calls(), 0);
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn invalid_payloads_are_rejected_without_store_call() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let cases = [
        (r#"{"userId":"abc-123"}"#, "missing_email"),
        (r#"{"userId":"abc-123","email":"   "}"#, "missing_email"),
        (r#"{"userId":"","email":"a@b.com"}"#, "missing_user_id"),
        (r#"{"userId":"abc-123","email":"nope"}"#, "invalid_email"),
        ("{not json", "invalid_json"),
        ("", "invalid_json"),
    ];
    for (payload, reason) in cases {
        let (status, body) = send(&app, post_json("/cognito-webhook", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
        assert_eq!(body["error"], reason, "payload: {payload}");
    }

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn store_failure_maps_to_server_error() {
    let store = Arc::new(MemoryStore::default());
    store.take_down();
    let app = app_with(store.clone());

    let (status, body) = send(&app, post_json("/cognito-webhook", SCENARIO_BODY)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "store_unavailable");
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_webhook_stores_sample_user() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let (status, body) = send(&app, post_json("/test-webhook", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Test webhook executed successfully");
    assert_eq!(body["result"]["status"], "ok");
    assert_eq!(body["result"]["created"], true);
    assert_eq!(body["result"]["message"], "User created successfully");
    assert_eq!(body["result"]["provider_user_id"], "test-user-123");
    assert_eq!(body["test_data"]["userName"], "test-user-123");
    assert_eq!(body["test_data"]["region"], "us-east-1");

    let row = store.get("test-user-123").expect("sample stored");
    assert_eq!(row.email.as_str(), "test@example.com");
    assert_eq!(row.name.as_deref(), Some("Test User"));
    assert_eq!(row.picture_url.as_deref(), Some("https://example.com/pic.jpg"));

    let (status, again) = send(&app, post_json("/test-webhook", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["message"], "Test webhook executed successfully");
    assert_eq!(again["result"]["created"], false);
    assert_eq!(store.rows().len(), 1);
}

#[tokio::test]
async fn test_webhook_reports_store_failure() {
    let store = Arc::new(MemoryStore::default());
    store.take_down();
    let app = app_with(store);

    let (status, body) = send(&app, post_json("/test-webhook", "")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "store_unavailable");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = app_with(Arc::new(MemoryStore::default()));

    let response = tower::ServiceExt::oneshot(app, post_json("/cognito-webhook", SCENARIO_BODY))
        .await
        .expect("response");

    assert!(response.headers().contains_key("x-request-id"));
}
