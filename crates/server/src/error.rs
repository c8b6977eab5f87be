//! Unified error handling with Sentry integration.
//!
//! Every fault a request can hit ends up as an [`AppError`], which renders a
//! JSON body `{"error": "<reason>", "message": "<text>"}` and captures server
//! errors to Sentry before responding.

use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::models::EventError;

/// Application-level error type for the webhook receiver.
#[derive(Debug, Error)]
pub enum AppError {
    /// The payload was malformed or incomplete.
    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] EventError),

    /// The record store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable reason
    pub error: &'static str,
    /// Human-readable description
    pub message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEvent(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidEvent(err) => err.reason(),
            Self::Store(err) if err.is_unavailable() => "store_unavailable",
            Self::Store(_) => "store_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                reason = self.reason(),
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, reason = self.reason(), "Rejected event");
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::InvalidEvent(err) => err.to_string(),
            Self::Store(err) if err.is_unavailable() => "Database unavailable".to_string(),
            Self::Store(_) => "Failed to store user record".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        };

        let body = ErrorBody {
            error: self.reason(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Response for a handler that panicked, used by the outermost panic layer.
#[allow(clippy::needless_pass_by_value)] // signature required by CatchPanicLayer
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(ToString::to_string))
        .unwrap_or_else(|| "unknown panic".to_string());

    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
