//! Order reads and status changes.
//!
//! Orders are written only by the storefront. The admin side reads them and
//! moves them through the status lifecycle; it never deletes them.

use sqlx::PgPool;
use thiserror::Error;

use endulque_core::{OrderId, OrderStatus};

use super::RepositoryError;
use crate::models::{
    OrderDetail, OrderFilter, OrderHeader, OrderItemAddOnDetail, OrderItemDetail, OrderSummary,
};

/// Default page size for the order list.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size a caller may ask for.
pub const MAX_LIMIT: i64 = 200;

const HEADER_SELECT: &str = r"
    SELECT o.id, o.buyer_id, b.name AS buyer_name, b.address AS buyer_address,
           b.phone AS buyer_phone, o.total_price, o.status, o.created_at, o.updated_at
    FROM orders o
    JOIN buyer b ON b.id = o.buyer_id
";

/// Errors from changing an order's status.
#[derive(Debug, Error)]
pub enum StatusChangeError {
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for StatusChangeError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Clamp a requested page to sane bounds.
#[must_use]
pub fn page(filter: &OrderFilter) -> (i64, i64) {
    let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = filter.offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, RepositoryError> {
        let (limit, offset) = page(filter);
        let rows = sqlx::query_as::<_, OrderSummary>(
            r"
            SELECT o.id, b.name AS buyer_name, b.phone AS buyer_phone,
                   o.total_price, o.status, o.created_at
            FROM orders o
            JOIN buyer b ON b.id = o.buyer_id
            WHERE $1::order_status IS NULL OR o.status = $1
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(filter.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Load an order with its buyer, items and add-ons.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no such order.
    pub async fn detail(&self, id: OrderId) -> Result<OrderDetail, RepositoryError> {
        let header = sqlx::query_as::<_, OrderHeader>(&format!("{HEADER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let items = sqlx::query_as::<_, OrderItemDetail>(
            r"
            SELECT i.id, i.product_id, p.name AS product_name,
                   i.variant_id, v.name AS variant_name, i.quantity, i.unit_price
            FROM order_item i
            LEFT JOIN product p ON p.id = i.product_id
            LEFT JOIN variant v ON v.id = i.variant_id
            WHERE i.order_id = $1
            ORDER BY i.position
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let add_ons = sqlx::query_as::<_, OrderItemAddOnDetail>(
            r"
            SELECT x.id, x.order_item_id, x.add_on_id, a.name AS add_on_name,
                   x.quantity, x.unit_price
            FROM order_item_add_on x
            JOIN order_item i ON i.id = x.order_item_id
            LEFT JOIN add_on a ON a.id = x.add_on_id
            WHERE i.order_id = $1
            ORDER BY x.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(OrderDetail::assemble(header, items, add_ons))
    }

    /// Move an order to `next` if the lifecycle allows it.
    ///
    /// The current status is locked while the change is checked.
    ///
    /// # Errors
    ///
    /// Returns `StatusChangeError::InvalidTransition` for a disallowed move
    /// and `RepositoryError::NotFound` if there is no such order.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<OrderStatus, StatusChangeError> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_scalar::<_, OrderStatus>("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        if !current.can_transition_to(next) {
            return Err(StatusChangeError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(next)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(order_id = %id, from = %current, to = %next, "Order status changed");
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamps() {
        assert_eq!(page(&OrderFilter::default()), (DEFAULT_LIMIT, 0));
        let filter = OrderFilter {
            status: None,
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(page(&filter), (MAX_LIMIT, 0));
        let filter = OrderFilter {
            status: Some(OrderStatus::Pending),
            limit: Some(0),
            offset: Some(20),
        };
        assert_eq!(page(&filter), (1, 20));
    }
}
