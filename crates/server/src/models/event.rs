//! Inbound registration event.
//!
//! # Envelope
//!
//! Two shapes are accepted in the same JSON object, flat fields winning over
//! the Cognito trigger fields when both are present:
//!
//! ```text
//! user id   : userId        | userName
//! email     : email         | request.userAttributes.email
//! name      : name          | request.userAttributes.name
//! picture   : picture       | request.userAttributes.picture
//! provider  : provider      | (configured default)
//! trigger   : triggerSource
//! ```
//!
//! A flat event looks like `{"userId":"abc-123","email":"a@b.com"}`; a Cognito
//! `PostConfirmation` trigger carries `userName`, `triggerSource`, and the
//! attributes under `request.userAttributes`. Unknown fields are ignored.

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use signup_hook_core::{Email, EmailError, ProviderUserId, ProviderUserIdError};

use crate::config::TestEventConfig;

/// Provider user id of the synthetic test event.
pub const TEST_USER_NAME: &str = "test-user-123";
/// Email of the synthetic test event.
pub const TEST_EMAIL: &str = "test@example.com";
/// Display name of the synthetic test event.
pub const TEST_NAME: &str = "Test User";
/// Picture URL of the synthetic test event.
pub const TEST_PICTURE: &str = "https://example.com/pic.jpg";

/// Reasons an inbound event is rejected.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing required field: userId (or userName)")]
    MissingUserId,

    #[error("missing required field: email")]
    MissingEmail,

    #[error("invalid user id: {0}")]
    InvalidUserId(#[from] ProviderUserIdError),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

impl EventError {
    /// Machine-readable reason reported in error responses.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "invalid_json",
            Self::MissingUserId => "missing_user_id",
            Self::MissingEmail => "missing_email",
            Self::InvalidUserId(_) => "invalid_user_id",
            Self::InvalidEmail(_) => "invalid_email",
        }
    }
}

/// The webhook body as delivered, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEnvelope {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub provider: Option<String>,
    pub trigger_source: Option<String>,
    pub region: Option<String>,
    pub user_pool_id: Option<String>,
    pub request: Option<TriggerRequest>,
}

/// The `request` object of a Cognito trigger.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRequest {
    pub user_attributes: Option<UserAttributes>,
}

/// Standard attributes Cognito forwards for the confirmed user.
#[derive(Debug, Default, Deserialize)]
pub struct UserAttributes {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// A validated registration event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub provider_user_id: ProviderUserId,
    pub email: Email,
    pub name: Option<String>,
    pub picture_url: Option<String>,
    pub provider: String,
}

impl WebhookEnvelope {
    /// Decode a raw request body.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidJson`] if the body is not a JSON object of
    /// the expected shape.
    pub fn from_slice(body: &[u8]) -> Result<Self, EventError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decode an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidJson`] if the value has the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        Ok(serde_json::from_value(value)?)
    }

    /// The trigger source, if present and different from `accepted`.
    ///
    /// Events without a trigger source are never ignored.
    #[must_use]
    pub fn ignored_trigger(&self, accepted: &str) -> Option<&str> {
        self.trigger_source
            .as_deref()
            .filter(|source| *source != accepted)
    }

    /// Validate required fields and resolve the canonical event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError`] if the user id or email is missing, blank, or
    /// malformed.
    pub fn into_event(self, default_provider: &str) -> Result<InboundEvent, EventError> {
        let attributes = self
            .request
            .and_then(|request| request.user_attributes)
            .unwrap_or_default();

        let raw_id = first_present(self.user_id, self.user_name).ok_or(EventError::MissingUserId)?;
        let raw_email = first_present(self.email, attributes.email).ok_or(EventError::MissingEmail)?;

        Ok(InboundEvent {
            provider_user_id: ProviderUserId::parse(&raw_id)?,
            email: Email::parse(&raw_email)?,
            name: first_present(self.name, attributes.name),
            picture_url: first_present(self.picture, attributes.picture),
            provider: present(self.provider).unwrap_or_else(|| default_provider.to_string()),
        })
    }
}

/// Trimmed value, or `None` if absent or blank.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn first_present(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    present(primary).or_else(|| present(fallback))
}

/// The fixed Cognito `PostConfirmation` event used by `POST /test-webhook`.
#[must_use]
pub fn sample_event(test: &TestEventConfig, trigger_source: &str) -> Value {
    json!({
        "version": "1",
        "region": test.region,
        "userPoolId": test.user_pool_id,
        "userName": TEST_USER_NAME,
        "callerContext": {},
        "triggerSource": trigger_source,
        "request": {
            "userAttributes": {
                "email": TEST_EMAIL,
                "name": TEST_NAME,
                "picture": TEST_PICTURE,
            }
        },
        "response": {}
    })
}
