//! Record store for registered users.
//!
//! # Database
//!
//! A single `users` table, created by
//! `crates/server/migrations/20260101000001_create_users.sql`. The schema is
//! applied by operators; the service never migrates on startup.
//!
//! # Seams
//!
//! Handlers only see the [`UserStore`] trait. [`PgUserStore`] is the
//! production implementation; tests inject in-memory stores.

pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::error::ErrorKind;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::models::user::{NewUser, UserRecord};

pub use users::PgUserStore;

/// Errors from the record store.
///
/// A duplicate provider user id or email is not an error: it is reported as
/// [`CreateOutcome::created`] `== false`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be reached or did not answer in time.
    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// A constraint other than the expected duplicate key was violated.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The database refused the candidate values.
    #[error("invalid candidate: {0}")]
    InvalidCandidate(String),

    /// Any other query failure.
    #[error("database error: {0}")]
    Query(#[source] sqlx::Error),

    /// A stored row could not be read back into a [`UserRecord`].
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl StoreError {
    /// Whether the failure is a connectivity problem rather than a bad query.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::DataCorruption(err.to_string())
            }
            sqlx::Error::Database(ref db_err) => {
                let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
                let kind = db_err.kind();
                let message = db_err.message().to_owned();
                match kind {
                    ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation => Self::Constraint(message),
                    _ if is_unavailable_code(&code) => Self::Unavailable(err),
                    // SQLSTATE class 22: data exception
                    _ if code.starts_with("22") => Self::InvalidCandidate(message),
                    _ => Self::Query(err),
                }
            }
            other => Self::Query(other),
        }
    }
}

/// SQLSTATE codes that mean the server is unreachable, overloaded, or gave up.
fn is_unavailable_code(code: &str) -> bool {
    // 08: connection exception, 53: insufficient resources,
    // 57014: statement_timeout hit, 57P0x: server shutting down
    code.starts_with("08") || code.starts_with("53") || code == "57014" || code.starts_with("57P0")
}

/// Result of [`UserStore::create_if_absent`].
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    /// `true` if this call inserted the row.
    pub created: bool,
    /// The stored record (new or pre-existing).
    pub record: UserRecord,
}

/// Persistence operations used by the webhook handler.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert `candidate` unless a user with the same provider user id or
    /// email already exists, in which case the existing record is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for connectivity loss, unexpected constraint
    /// violations, and rejected candidate data. Duplicates are not errors.
    async fn create_if_absent(&self, candidate: &NewUser) -> Result<CreateOutcome, StoreError>;

    /// Bounded connectivity probe. Never mutates data.
    async fn ping(&self) -> bool;
}

/// Build connection options from discrete settings.
#[must_use]
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .password(config.password.expose_secret())
        .application_name(env!("CARGO_PKG_NAME"))
        .options([(
            "statement_timeout",
            config.statement_timeout.as_millis().to_string(),
        )])
}

/// Pool settings: bounded size and a bounded wait for a free connection.
#[must_use]
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(0)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Duration::from_secs(600))
}
