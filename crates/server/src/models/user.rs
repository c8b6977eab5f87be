//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use signup_hook_core::{Email, ProviderUserId, UserId};

use super::event::InboundEvent;

/// A user registered through the identity provider (domain type).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    /// Internal ID, generated once.
    pub id: UserId,
    /// Identity provider's user key (stored as `cognito_user_id`).
    pub provider_user_id: ProviderUserId,
    pub email: Email,
    pub name: Option<String>,
    pub picture_url: Option<String>,
    /// Identity provider name (e.g. `google`).
    pub provider: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed whenever the same provider user registers again.
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub onboarding_completed: bool,
    pub preferences: Map<String, Value>,
}

/// Candidate record handed to the store.
///
/// Lifecycle fields (timestamps, flags, preferences) take their defaults when
/// the row is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: UserId,
    pub provider_user_id: ProviderUserId,
    pub email: Email,
    pub name: Option<String>,
    pub picture_url: Option<String>,
    pub provider: String,
}

impl NewUser {
    /// Build a candidate from a validated event, generating a fresh ID.
    ///
    /// The ID is only used if the store actually inserts the row.
    #[must_use]
    pub fn from_event(event: InboundEvent) -> Self {
        Self {
            id: UserId::generate(),
            provider_user_id: event.provider_user_id,
            email: event.email,
            name: event.name,
            picture_url: event.picture_url,
            provider: event.provider,
        }
    }

    /// The record as it looks right after insertion.
    #[must_use]
    pub fn into_record(self, now: DateTime<Utc>) -> UserRecord {
        UserRecord {
            id: self.id,
            provider_user_id: self.provider_user_id,
            email: self.email,
            name: self.name,
            picture_url: self.picture_url,
            provider: self.provider,
            created_at: now,
            updated_at: now,
            is_active: true,
            onboarding_completed: false,
            preferences: Map::new(),
        }
    }
}
