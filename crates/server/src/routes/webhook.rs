//! Registration webhook intake.

use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use serde_json::Value;

use signup_hook_core::{Email, ProviderUserId, UserId};

use crate::error::Result;
use crate::models::WebhookEnvelope;
use crate::models::event::sample_event;
use crate::services::{Registration, register};
use crate::state::AppState;

/// Acknowledgement returned to the identity provider.
///
/// `provider_user_id` is always the id from the processed event; `user_id`
/// and `email` come from the stored record, which may belong to another
/// provider user id when the email was already registered.
///
/// Duplicates are acknowledged exactly like new registrations so the caller
/// never retries them.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WebhookAck {
    Ok {
        created: bool,
        message: &'static str,
        user_id: UserId,
        provider_user_id: ProviderUserId,
        email: Email,
    },
    Ignored {
        message: &'static str,
        trigger_source: String,
    },
}

impl From<Registration> for WebhookAck {
    fn from(registration: Registration) -> Self {
        match registration {
            Registration::Stored {
                provider_user_id,
                outcome,
            } => Self::Ok {
                created: outcome.created,
                message: if outcome.created {
                    "User created successfully"
                } else {
                    "User already exists"
                },
                user_id: outcome.record.id,
                provider_user_id,
                email: outcome.record.email,
            },
            Registration::Ignored { trigger_source } => Self::Ignored {
                message: "Event ignored",
                trigger_source,
            },
        }
    }
}

/// Response of the synthetic test endpoint.
#[derive(Debug, Serialize)]
pub struct TestWebhookResponse {
    pub message: &'static str,
    /// The acknowledgement the real webhook would have returned.
    pub result: WebhookAck,
    /// The synthetic event that was processed.
    pub test_data: Value,
}

/// `POST /cognito-webhook`
///
/// The body is taken raw so that malformed JSON is reported with this
/// service's error shape instead of the framework's rejection.
pub async fn cognito_webhook(State(state): State<AppState>, body: Bytes) -> Result<Json<WebhookAck>> {
    let envelope = WebhookEnvelope::from_slice(&body)?;
    let registration = register(&state, envelope).await?;
    Ok(Json(registration.into()))
}

/// `POST /test-webhook`
///
/// Runs a fixed sample event through the same path as the real webhook.
pub async fn test_webhook(State(state): State<AppState>) -> Result<Json<TestWebhookResponse>> {
    let config = state.config();
    let test_data = sample_event(&config.test_event, &config.trigger_source);

    let envelope = WebhookEnvelope::from_value(test_data.clone())?;
    let registration = register(&state, envelope).await?;

    Ok(Json(TestWebhookResponse {
        message: "Test webhook executed successfully",
        result: registration.into(),
        test_data,
    }))
}
