//! `PostgreSQL` implementation of the record store.
//!
//! Queries are runtime-checked (`query_as`) so the crate builds without a
//! live database.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, instrument, warn};

use signup_hook_core::{Email, ProviderUserId, UserId};

use super::{CreateOutcome, StoreError, UserStore, connect_options, pool_options};
use crate::config::DatabaseConfig;
use crate::models::user::{NewUser, UserRecord};

/// Name of the unique constraint on `users.email`.
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Insert the candidate; on a provider id clash only `updated_at` moves.
/// `xmax = 0` holds only for a freshly inserted tuple.
const CREATE_IF_ABSENT: &str = r"
    INSERT INTO users (
        id, cognito_user_id, email, name, picture_url, provider,
        created_at, updated_at, is_active, onboarding_completed, preferences
    )
    VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW(), TRUE, FALSE, '{}'::jsonb)
    ON CONFLICT (cognito_user_id) DO UPDATE SET updated_at = EXCLUDED.updated_at
    RETURNING id, cognito_user_id, email, name, picture_url, provider,
              created_at, updated_at, is_active, onboarding_completed, preferences,
              (xmax = 0) AS created
";

const SELECT_COLUMNS: &str = r"
    SELECT id, cognito_user_id, email, name, picture_url, provider,
           created_at, updated_at, is_active, onboarding_completed, preferences
    FROM users
";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    cognito_user_id: ProviderUserId,
    email: Email,
    name: Option<String>,
    picture_url: Option<String>,
    provider: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_active: bool,
    onboarding_completed: bool,
    preferences: Json<Map<String, Value>>,
}

#[derive(sqlx::FromRow)]
struct CreatedRow {
    #[sqlx(flatten)]
    user: UserRow,
    created: bool,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            provider_user_id: row.cognito_user_id,
            email: row.email,
            name: row.name,
            picture_url: row.picture_url,
            provider: row.provider,
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_active: row.is_active,
            onboarding_completed: row.onboarding_completed,
            preferences: row.preferences.0,
        }
    }
}

/// Record store backed by a `PostgreSQL` connection pool.
///
/// Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    ping_timeout: Duration,
}

impl PgUserStore {
    /// Connect to the configured database, failing if it is unreachable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if no connection can be established
    /// within the acquire timeout.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = pool_options(config)
            .connect_with(connect_options(config))
            .await?;
        Ok(Self::from_pool(pool, config.ping_timeout))
    }

    /// Build a store whose connections are opened on first use.
    #[must_use]
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = pool_options(config).connect_lazy_with(connect_options(config));
        Self::from_pool(pool, config.ping_timeout)
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool, ping_timeout: Duration) -> Self {
        Self { pool, ping_timeout }
    }

    /// Close every pooled connection. Used on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Find a user by provider user id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn find_by_provider_user_id(
        &self,
        provider_user_id: &ProviderUserId,
    ) -> Result<Option<UserRecord>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE cognito_user_id = $1"))
                .bind(provider_user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(UserRecord::from))
    }

    /// Find a user by email.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UserRecord::from))
    }

    /// Resolve an email clash: the address belongs to an existing user.
    async fn existing_by_email(&self, email: &Email) -> Result<CreateOutcome, StoreError> {
        match self.find_by_email(email).await? {
            Some(record) => {
                debug!(user_id = %record.id, "Email already registered to another provider user id");
                Ok(CreateOutcome {
                    created: false,
                    record,
                })
            }
            // Row removed between the insert and the read
            None => Err(StoreError::Constraint(
                "email conflict could not be resolved".to_string(),
            )),
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip_all, fields(provider_user_id = %candidate.provider_user_id))]
    async fn create_if_absent(&self, candidate: &NewUser) -> Result<CreateOutcome, StoreError> {
        let result = sqlx::query_as::<_, CreatedRow>(CREATE_IF_ABSENT)
            .bind(candidate.id)
            .bind(&candidate.provider_user_id)
            .bind(&candidate.email)
            .bind(candidate.name.as_deref())
            .bind(candidate.picture_url.as_deref())
            .bind(&candidate.provider)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(CreateOutcome {
                created: row.created,
                record: row.user.into(),
            }),
            Err(sqlx::Error::Database(ref db_err))
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) =>
            {
                self.existing_by_email(&candidate.email).await
            }
            Err(e) => {
                let err = StoreError::from(e);
                warn!(error = %err, "create_if_absent failed");
                Err(err)
            }
        }
    }

    async fn ping(&self) -> bool {
        let probe = sqlx::query("SELECT 1").execute(&self.pool);
        match tokio::time::timeout(self.ping_timeout, probe).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Database ping failed");
                false
            }
            Err(_) => {
                warn!(
                    timeout_ms = u64::try_from(self.ping_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Database ping timed out"
                );
                false
            }
        }
    }
}
