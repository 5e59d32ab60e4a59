//! Variants, add-ons and ready dates. Each belongs to one product and is
//! reached through the product's owner.

use sqlx::PgPool;

use endulque_core::{AddOnId, OwnerId, ProductId, ReadyDateId, VariantId};

use super::RepositoryError;
use crate::models::{AddOn, PricedInput, ReadyDate, ReadyDateInput, Variant};

fn deleted_or_missing(rows: u64) -> Result<(), RepositoryError> {
    if rows == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

// =============================================================================
// Variants
// =============================================================================

/// Repository for product variants.
pub struct VariantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VariantRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Variants of a product, oldest first.
    ///
    /// Callers check the product belongs to the owner first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, product_id: ProductId) -> Result<Vec<Variant>, RepositoryError> {
        let rows = sqlx::query_as::<_, Variant>(
            "SELECT id, product_id, name, price FROM variant WHERE product_id = $1 ORDER BY id",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add a variant to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not belong to
    /// `owner`.
    pub async fn create(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        input: &PricedInput,
    ) -> Result<Variant, RepositoryError> {
        sqlx::query_as::<_, Variant>(
            r"
            INSERT INTO variant (product_id, name, price)
            SELECT p.id, $3, $4 FROM product p WHERE p.owner_id = $1 AND p.id = $2
            RETURNING id, product_id, name, price
            ",
        )
        .bind(owner)
        .bind(product_id)
        .bind(&input.name)
        .bind(input.price)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Rename or reprice a variant. Existing orders keep their price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant is not the owner's.
    pub async fn update(
        &self,
        owner: OwnerId,
        id: VariantId,
        input: &PricedInput,
    ) -> Result<Variant, RepositoryError> {
        sqlx::query_as::<_, Variant>(
            r"
            UPDATE variant v SET name = $3, price = $4
            FROM product p
            WHERE v.id = $2 AND p.id = v.product_id AND p.owner_id = $1
            RETURNING v.id, v.product_id, v.name, v.price
            ",
        )
        .bind(owner)
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    pub async fn delete(&self, owner: OwnerId, id: VariantId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM variant v USING product p
            WHERE v.id = $2 AND p.id = v.product_id AND p.owner_id = $1
            ",
        )
        .bind(owner)
        .bind(id)
        .execute(self.pool)
        .await?;
        deleted_or_missing(result.rows_affected())
    }
}

// =============================================================================
// Add-ons
// =============================================================================

/// Repository for product add-ons.
pub struct AddOnRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddOnRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add-ons of a product, oldest first.
    ///
    /// Callers check the product belongs to the owner first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, product_id: ProductId) -> Result<Vec<AddOn>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddOn>(
            "SELECT id, product_id, name, price FROM add_on WHERE product_id = $1 ORDER BY id",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add an add-on to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not belong to
    /// `owner`.
    pub async fn create(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        input: &PricedInput,
    ) -> Result<AddOn, RepositoryError> {
        sqlx::query_as::<_, AddOn>(
            r"
            INSERT INTO add_on (product_id, name, price)
            SELECT p.id, $3, $4 FROM product p WHERE p.owner_id = $1 AND p.id = $2
            RETURNING id, product_id, name, price
            ",
        )
        .bind(owner)
        .bind(product_id)
        .bind(&input.name)
        .bind(input.price)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Rename or reprice an add-on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the add-on is not the owner's.
    pub async fn update(
        &self,
        owner: OwnerId,
        id: AddOnId,
        input: &PricedInput,
    ) -> Result<AddOn, RepositoryError> {
        sqlx::query_as::<_, AddOn>(
            r"
            UPDATE add_on a SET name = $3, price = $4
            FROM product p
            WHERE a.id = $2 AND p.id = a.product_id AND p.owner_id = $1
            RETURNING a.id, a.product_id, a.name, a.price
            ",
        )
        .bind(owner)
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an add-on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    pub async fn delete(&self, owner: OwnerId, id: AddOnId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM add_on a USING product p
            WHERE a.id = $2 AND p.id = a.product_id AND p.owner_id = $1
            ",
        )
        .bind(owner)
        .bind(id)
        .execute(self.pool)
        .await?;
        deleted_or_missing(result.rows_affected())
    }
}

// =============================================================================
// Ready dates
// =============================================================================

/// Repository for the dates a product can be picked up.
pub struct ReadyDateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReadyDateRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Ready dates of a product, earliest first.
    ///
    /// Callers check the product belongs to the owner first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, product_id: ProductId) -> Result<Vec<ReadyDate>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReadyDate>(
            "SELECT id, product_id, ready_on FROM ready_date WHERE product_id = $1 ORDER BY ready_on",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add a ready date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not belong to
    /// `owner`, `RepositoryError::Conflict` if the date is already listed.
    pub async fn create(
        &self,
        owner: OwnerId,
        product_id: ProductId,
        input: &ReadyDateInput,
    ) -> Result<ReadyDate, RepositoryError> {
        sqlx::query_as::<_, ReadyDate>(
            r"
            INSERT INTO ready_date (product_id, ready_on)
            SELECT p.id, $3 FROM product p WHERE p.owner_id = $1 AND p.id = $2
            RETURNING id, product_id, ready_on
            ",
        )
        .bind(owner)
        .bind(product_id)
        .bind(input.ready_on)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_or(e, "ready date already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Remove a ready date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    pub async fn delete(&self, owner: OwnerId, id: ReadyDateId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM ready_date r USING product p
            WHERE r.id = $2 AND p.id = r.product_id AND p.owner_id = $1
            ",
        )
        .bind(owner)
        .bind(id)
        .execute(self.pool)
        .await?;
        deleted_or_missing(result.rows_affected())
    }
}
