//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use endulque_core::OwnerId;

use crate::config::AdminConfig;
use crate::services::{AuthClient, StorageClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    auth: AuthClient,
    storage: StorageClient,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool, auth: AuthClient, storage: StorageClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                auth,
                storage,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Auth provider client.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Image storage client (service-role).
    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    /// The shop owner; every catalog query is scoped by it.
    #[must_use]
    pub fn owner_id(&self) -> OwnerId {
        self.inner.config.owner_id
    }
}
