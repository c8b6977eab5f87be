//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WebhookConfig;
use crate::db::UserStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The record store is injected
/// at construction time; handlers never reach for a global connection.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebhookConfig,
    store: Arc<dyn UserStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Webhook receiver configuration
    /// * `store` - Record store used for every request
    pub fn new(config: WebhookConfig, store: impl UserStore + 'static) -> Self {
        Self::with_shared_store(config, Arc::new(store))
    }

    /// Create a new application state around an already shared store.
    #[must_use]
    pub fn with_shared_store(config: WebhookConfig, store: Arc<dyn UserStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &WebhookConfig {
        &self.inner.config
    }

    /// Get a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.inner.store.as_ref()
    }
}
