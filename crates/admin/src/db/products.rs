//! Product repository.

use sqlx::PgPool;

use endulque_core::{CategoryId, OwnerId, ProductId};

use super::RepositoryError;
use super::options::{AddOnRepository, ReadyDateRepository, VariantRepository};
use crate::models::{Product, ProductDetail, ProductInput};

const PRODUCT_COLUMNS: &str =
    "id, category_id, name, description, image_url, is_active, created_at, updated_at";

/// Repository for the owner's products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products by name, including inactive ones, optionally only those
    /// in one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        owner: OwnerId,
        category: Option<CategoryId>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM product
            WHERE owner_id = $1 AND ($2::int8 IS NULL OR category_id = $2)
            ORDER BY name, id
            "
        ))
        .bind(owner)
        .bind(category)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not belong to
    /// `owner`.
    pub async fn get(&self, owner: OwnerId, id: ProductId) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE owner_id = $1 AND id = $2"
        ))
        .bind(owner)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Get a product with its variants, add-ons and ready dates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not belong to
    /// `owner`.
    pub async fn detail(
        &self,
        owner: OwnerId,
        id: ProductId,
    ) -> Result<ProductDetail, RepositoryError> {
        let product = self.get(owner, id).await?;
        let variants = VariantRepository::new(self.pool).list(id).await?;
        let add_ons = AddOnRepository::new(self.pool).list(id).await?;
        let ready_dates = ReadyDateRepository::new(self.pool).list(id).await?;

        Ok(ProductDetail {
            product,
            variants,
            add_ons,
            ready_dates,
        })
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: OwnerId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO product (owner_id, category_id, name, description, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Replace a product's details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not belong to
    /// `owner`.
    pub async fn update(
        &self,
        owner: OwnerId,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE product
            SET category_id = $3, name = $4, description = $5, is_active = $6,
                updated_at = NOW()
            WHERE owner_id = $1 AND id = $2
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Point a product at a new image and return the previous URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not belong to
    /// `owner`.
    pub async fn set_image(
        &self,
        owner: OwnerId,
        id: ProductId,
        image_url: Option<&str>,
    ) -> Result<Option<String>, RepositoryError> {
        sqlx::query_scalar::<_, Option<String>>(
            r"
            UPDATE product AS p
            SET image_url = $3, updated_at = NOW()
            FROM (SELECT id, image_url FROM product WHERE owner_id = $1 AND id = $2 FOR UPDATE) AS old
            WHERE p.id = old.id
            RETURNING old.image_url
            ",
        )
        .bind(owner)
        .bind(id)
        .bind(image_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product and everything attached to it. Returns the image URL
    /// it had, if any. Past order items keep their price and lose the link.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    pub async fn delete(
        &self,
        owner: OwnerId,
        id: ProductId,
    ) -> Result<Option<String>, RepositoryError> {
        sqlx::query_scalar::<_, Option<String>>(
            "DELETE FROM product WHERE owner_id = $1 AND id = $2 RETURNING image_url",
        )
        .bind(owner)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
