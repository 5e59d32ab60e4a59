//! Cached menu.
//!
//! The assembled menu is kept in memory via `moka` and refreshed after the
//! configured TTL. A TTL of zero always reads from the database.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use endulque_core::OwnerId;

use crate::db::{MenuRepository, RepositoryError};
use crate::models::Menu;

/// In-memory menu cache keyed by owner.
#[derive(Clone)]
pub struct MenuCache {
    cache: Option<Cache<OwnerId, Arc<Menu>>>,
}

impl MenuCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(16)
                .time_to_live(ttl)
                .build()
        });
        Self { cache }
    }

    /// The owner's menu, from memory when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the menu has to be loaded and loading fails.
    pub async fn menu(&self, pool: &PgPool, owner: OwnerId) -> Result<Arc<Menu>, RepositoryError> {
        let Some(cache) = &self.cache else {
            return MenuRepository::new(pool).list_menu(owner).await.map(Arc::new);
        };

        if let Some(menu) = cache.get(&owner).await {
            debug!("Cache hit for menu");
            return Ok(menu);
        }

        let menu = Arc::new(MenuRepository::new(pool).list_menu(owner).await?);
        cache.insert(owner, Arc::clone(&menu)).await;
        Ok(menu)
    }
}
