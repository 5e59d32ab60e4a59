//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use endulque_core::OwnerId;

use crate::config::StorefrontConfig;
use crate::services::MenuCache;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    menu_cache: MenuCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let menu_cache = MenuCache::new(config.menu_cache_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                menu_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the menu cache.
    #[must_use]
    pub fn menu_cache(&self) -> &MenuCache {
        &self.inner.menu_cache
    }

    /// The shop owner whose catalog is served.
    #[must_use]
    pub fn owner_id(&self) -> OwnerId {
        self.inner.config.owner_id
    }
}
