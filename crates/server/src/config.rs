//! Webhook receiver configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DB_USER` - `PostgreSQL` user
//! - `DB_PASSWORD` - `PostgreSQL` password
//!
//! ## Optional
//! - `DB_HOST` - `PostgreSQL` host (default: localhost)
//! - `DB_PORT` - `PostgreSQL` port (default: 5432)
//! - `DB_NAME` - Database name (default: agent)
//! - `DB_MAX_CONNECTIONS` - Pool size bound (default: 10)
//! - `DB_ACQUIRE_TIMEOUT_SECS` - Pool acquire timeout (default: 5)
//! - `DB_STATEMENT_TIMEOUT_MS` - Server-side statement timeout (default: 5000)
//! - `DB_PING_TIMEOUT_SECS` - Health probe timeout (default: 2)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8000)
//! - `LOG_LEVEL` - Log verbosity for this crate (default: info, `RUST_LOG` wins)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `APP_TITLE` - Service name reported by `GET /` (default: Cognito Webhook)
//! - `DEFAULT_PROVIDER` - Provider stored when the event has none (default: google)
//! - `TRIGGER_SOURCE` - Accepted Cognito trigger (default: `PostConfirmation_ConfirmSignUp`)
//! - `TEST_USER_POOL_ID` - User pool reported by the synthetic test event
//! - `TEST_REGION` - Region reported by the synthetic test event
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Webhook receiver configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Record store connection settings
    pub database: DatabaseConfig,
    /// Log verbosity and output format
    pub logging: LoggingConfig,
    /// Human-readable service name
    pub app_title: String,
    /// Provider name used when the event does not carry one
    pub default_provider: String,
    /// The only Cognito trigger source that results in a stored user
    pub trigger_source: String,
    /// Values for the synthetic `/test-webhook` event
    pub test_event: TestEventConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: SecretString,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long a request waits for a pooled connection
    pub acquire_timeout: Duration,
    /// Server-side `statement_timeout` applied to every connection
    pub statement_timeout: Duration,
    /// Upper bound on the health probe round-trip
    pub ping_timeout: Duration,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level for this crate when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// Fixed identity reported by the synthetic test event.
#[derive(Debug, Clone)]
pub struct TestEventConfig {
    pub user_pool_id: String,
    pub region: String,
}

impl WebhookConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let database = DatabaseConfig {
            host: env.or_default("DB_HOST", "localhost"),
            port: env.parse_or_default("DB_PORT", "5432")?,
            name: env.or_default("DB_NAME", "agent"),
            user: env.required("DB_USER")?,
            password: SecretString::from(env.required("DB_PASSWORD")?),
            max_connections: env.parse_or_default("DB_MAX_CONNECTIONS", "10")?,
            acquire_timeout: Duration::from_secs(
                env.parse_or_default("DB_ACQUIRE_TIMEOUT_SECS", "5")?,
            ),
            statement_timeout: Duration::from_millis(
                env.parse_or_default("DB_STATEMENT_TIMEOUT_MS", "5000")?,
            ),
            ping_timeout: Duration::from_secs(env.parse_or_default("DB_PING_TIMEOUT_SECS", "2")?),
        };
        if database.max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host: env.parse_or_default("HOST", "0.0.0.0")?,
            port: env.parse_or_default("PORT", "8000")?,
            database,
            logging: LoggingConfig {
                level: env.or_default("LOG_LEVEL", "info").to_lowercase(),
                format: env.parse_or_default("LOG_FORMAT", "text")?,
            },
            app_title: env.or_default("APP_TITLE", "Cognito Webhook"),
            default_provider: env.or_default("DEFAULT_PROVIDER", "google"),
            trigger_source: env.or_default("TRIGGER_SOURCE", "PostConfirmation_ConfirmSignUp"),
            test_event: TestEventConfig {
                user_pool_id: env.or_default("TEST_USER_POOL_ID", "us-east-1_MeClCiUAC"),
                region: env.or_default("TEST_REGION", "us-east-1"),
            },
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Typed accessors over a variable lookup function.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get a variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or_default<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}
