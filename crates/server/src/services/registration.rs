//! Registration processing: envelope → validated event → create-if-absent.

use tracing::{Span, field, info, instrument};

use signup_hook_core::ProviderUserId;

use crate::db::CreateOutcome;
use crate::error::Result;
use crate::models::{NewUser, WebhookEnvelope};
use crate::state::AppState;

/// What happened to an accepted webhook.
#[derive(Debug)]
pub enum Registration {
    /// The user is stored (newly or already).
    Stored {
        /// Provider user id of the processed event.
        provider_user_id: ProviderUserId,
        outcome: CreateOutcome,
    },
    /// The event carried a trigger source this service does not handle.
    Ignored {
        /// The trigger source that was skipped.
        trigger_source: String,
    },
}

/// Process one registration envelope.
///
/// Validation happens before anything touches the store; a valid event results
/// in exactly one `create_if_absent` call.
///
/// # Errors
///
/// Returns `AppError::InvalidEvent` for missing or malformed fields and
/// `AppError::Store` when the record store fails.
#[instrument(
    skip_all,
    fields(
        trigger_source = envelope.trigger_source.as_deref().unwrap_or("none"),
        user_pool_id = envelope.user_pool_id.as_deref().unwrap_or("none"),
        region = envelope.region.as_deref().unwrap_or("none"),
        provider_user_id = field::Empty,
    )
)]
pub async fn register(state: &AppState, envelope: WebhookEnvelope) -> Result<Registration> {
    let config = state.config();

    if let Some(source) = envelope.ignored_trigger(&config.trigger_source) {
        info!(expected = %config.trigger_source, "Ignoring event with unhandled trigger source");
        return Ok(Registration::Ignored {
            trigger_source: source.to_string(),
        });
    }

    let event = envelope.into_event(&config.default_provider)?;
    Span::current().record("provider_user_id", event.provider_user_id.as_str());
    let provider_user_id = event.provider_user_id.clone();

    let outcome = state
        .store()
        .create_if_absent(&NewUser::from_event(event))
        .await?;

    if outcome.created {
        info!(user_id = %outcome.record.id, "User created");
    } else if outcome.record.provider_user_id == provider_user_id {
        info!(user_id = %outcome.record.id, "User already exists");
    } else {
        info!(
            user_id = %outcome.record.id,
            owner = %outcome.record.provider_user_id,
            "Email already registered to another provider user id"
        );
    }

    Ok(Registration::Stored {
        provider_user_id,
        outcome,
    })
}
