//! Menu repository.
//!
//! Reads the owner's active catalog. Child rows are fetched in one query per
//! table and stitched together in memory.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::PgPool;

use endulque_core::{CategoryId, OwnerId, ProductId};

use super::RepositoryError;
use crate::models::{Menu, MenuAddOn, MenuProduct, MenuVariant};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    category_id: Option<CategoryId>,
    name: String,
    description: String,
    image_url: Option<String>,
}

impl From<ProductRow> for MenuProduct {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            variants: Vec::new(),
            add_ons: Vec::new(),
            ready_dates: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReadyDateRow {
    product_id: ProductId,
    ready_on: NaiveDate,
}

/// Repository for the public menu.
pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
    /// Create a new menu repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the owner's full menu.
    ///
    /// Only active products are included. Ready dates in the past are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn list_menu(&self, owner: OwnerId) -> Result<Menu, RepositoryError> {
        let categories = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name
            FROM category
            WHERE owner_id = $1
            ORDER BY name, id
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        let products = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, category_id, name, description, image_url
            FROM product
            WHERE owner_id = $1 AND is_active
            ORDER BY name, id
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i64> = products.iter().map(|p| p.id.as_i64()).collect();
        let mut products: Vec<MenuProduct> = products.into_iter().map(Into::into).collect();
        self.attach_children(&ids, &mut products).await?;

        let categories = categories.into_iter().map(|c| (c.id, c.name)).collect();
        Ok(Menu::assemble(categories, products))
    }

    /// Load one active product with its variants, add-ons and ready dates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist,
    /// belongs to another owner, or is inactive.
    pub async fn get_product(
        &self,
        owner: OwnerId,
        id: ProductId,
    ) -> Result<MenuProduct, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, category_id, name, description, image_url
            FROM product
            WHERE owner_id = $1 AND id = $2 AND is_active
            ",
        )
        .bind(owner)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let mut products = vec![MenuProduct::from(row)];
        self.attach_children(&[id.as_i64()], &mut products).await?;
        products.pop().ok_or(RepositoryError::NotFound)
    }

    async fn attach_children(
        &self,
        product_ids: &[i64],
        products: &mut [MenuProduct],
    ) -> Result<(), RepositoryError> {
        if product_ids.is_empty() {
            return Ok(());
        }

        let variants = sqlx::query_as::<_, MenuVariant>(
            r"
            SELECT id, product_id, name, price
            FROM variant
            WHERE product_id = ANY($1)
            ORDER BY price, id
            ",
        )
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let add_ons = sqlx::query_as::<_, MenuAddOn>(
            r"
            SELECT id, product_id, name, price
            FROM add_on
            WHERE product_id = ANY($1)
            ORDER BY name, id
            ",
        )
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let ready_dates = sqlx::query_as::<_, ReadyDateRow>(
            r"
            SELECT product_id, ready_on
            FROM ready_date
            WHERE product_id = ANY($1) AND ready_on >= CURRENT_DATE
            ",
        )
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let mut variants_by_product: HashMap<ProductId, Vec<MenuVariant>> = HashMap::new();
        for v in variants {
            variants_by_product.entry(v.product_id).or_default().push(v);
        }
        let mut add_ons_by_product: HashMap<ProductId, Vec<MenuAddOn>> = HashMap::new();
        for a in add_ons {
            add_ons_by_product.entry(a.product_id).or_default().push(a);
        }
        let mut dates_by_product: HashMap<ProductId, Vec<NaiveDate>> = HashMap::new();
        for d in ready_dates {
            dates_by_product.entry(d.product_id).or_default().push(d.ready_on);
        }

        for product in products.iter_mut() {
            product.attach(
                &mut variants_by_product,
                &mut add_ons_by_product,
                &mut dates_by_product,
            );
        }
        Ok(())
    }
}
