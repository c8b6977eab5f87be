//! Identity provider user identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProviderUserId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderUserIdError {
    /// The input is empty or whitespace only.
    #[error("provider user id cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("provider user id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// The stable identifier the identity provider assigns to a user.
///
/// This is the idempotency key for record creation: one provider user id maps
/// to at most one stored user. For Cognito this is the `userName` of the
/// trigger event (e.g. `google_1234567890` for federated sign-ins).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProviderUserId(String);

impl ProviderUserId {
    /// Maximum accepted length, matching the `cognito_user_id` column.
    pub const MAX_LENGTH: usize = 255;

    /// Parse a `ProviderUserId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderUserIdError`] if the trimmed input is empty or longer
    /// than [`Self::MAX_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, ProviderUserIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProviderUserIdError::Empty);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(ProviderUserIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProviderUserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pg_text_newtype!(ProviderUserId);
