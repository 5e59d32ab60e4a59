//! Category repository.

use sqlx::PgPool;

use endulque_core::{CategoryId, OwnerId};

use super::RepositoryError;
use crate::models::{Category, CategoryInput};

/// Repository for the owner's categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner: OwnerId) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, created_at
            FROM category
            WHERE owner_id = $1
            ORDER BY name
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(
        &self,
        owner: OwnerId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            INSERT INTO category (owner_id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at
            ",
        )
        .bind(owner)
        .bind(&input.name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_or(e, "category name already exists"))
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not belong to
    /// `owner`, `RepositoryError::Conflict` if the name is taken.
    pub async fn rename(
        &self,
        owner: OwnerId,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            UPDATE category SET name = $3
            WHERE owner_id = $1 AND id = $2
            RETURNING id, name, created_at
            ",
        )
        .bind(owner)
        .bind(id)
        .bind(&input.name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_or(e, "category name already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category. Its products become uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    pub async fn delete(&self, owner: OwnerId, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE owner_id = $1 AND id = $2")
            .bind(owner)
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Whether `id` is one of the owner's categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, owner: OwnerId, id: CategoryId) -> Result<bool, RepositoryError> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM category WHERE owner_id = $1 AND id = $2)",
        )
        .bind(owner)
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(found)
    }
}
