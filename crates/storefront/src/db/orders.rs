//! Order writes on a single connection.
//!
//! [`PgOrderWriter`] borrows a connection (usually an open transaction) and
//! never commits on its own.

use rust_decimal::Decimal;
use sqlx::PgConnection;

use endulque_core::{
    AddOnLine, BuyerId, BuyerInfo, CartLine, OrderId, OrderItemId, OrderStatus, Price,
};

use super::RepositoryError;
use crate::services::orders::OrderWriter;

/// Writes order rows through a borrowed connection.
pub struct PgOrderWriter<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgOrderWriter<'c> {
    #[must_use]
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[derive(sqlx::FromRow)]
struct InsertedItem {
    id: OrderItemId,
    position: i32,
}

impl OrderWriter for PgOrderWriter<'_> {
    async fn insert_buyer(&mut self, buyer: &BuyerInfo) -> Result<BuyerId, RepositoryError> {
        let id = sqlx::query_scalar::<_, BuyerId>(
            r"
            INSERT INTO buyer (name, address, phone)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(buyer.name.trim())
        .bind(buyer.address.trim())
        .bind(buyer.phone.trim())
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(id)
    }

    async fn insert_order(
        &mut self,
        buyer_id: BuyerId,
        total: Price,
        status: OrderStatus,
    ) -> Result<OrderId, RepositoryError> {
        let id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO orders (buyer_id, total_price, status)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(buyer_id)
        .bind(total)
        .bind(status)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(id)
    }

    async fn insert_items(
        &mut self,
        order_id: OrderId,
        lines: &[CartLine],
    ) -> Result<Vec<OrderItemId>, RepositoryError> {
        let mut positions = Vec::with_capacity(lines.len());
        let mut product_ids = Vec::with_capacity(lines.len());
        let mut variant_ids = Vec::with_capacity(lines.len());
        let mut quantities = Vec::with_capacity(lines.len());
        let mut prices: Vec<Decimal> = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            positions.push(i32::try_from(idx).map_err(|_| {
                RepositoryError::DataCorruption(format!("too many order lines: {}", lines.len()))
            })?);
            product_ids.push(line.product_id.as_i64());
            variant_ids.push(line.variant_id.as_i64());
            quantities.push(line.quantity);
            prices.push(line.unit_price.amount());
        }

        let inserted = sqlx::query_as::<_, InsertedItem>(
            r"
            INSERT INTO order_item (order_id, position, product_id, variant_id, quantity, unit_price)
            SELECT $1, t.position, t.product_id, t.variant_id, t.quantity, t.unit_price
            FROM UNNEST($2::int4[], $3::int8[], $4::int8[], $5::int4[], $6::numeric[])
                AS t(position, product_id, variant_id, quantity, unit_price)
            RETURNING id, position
            ",
        )
        .bind(order_id)
        .bind(&positions)
        .bind(&product_ids)
        .bind(&variant_ids)
        .bind(&quantities)
        .bind(&prices)
        .fetch_all(&mut *self.conn)
        .await?;

        // RETURNING order is not guaranteed; map back by position.
        let mut ids: Vec<Option<OrderItemId>> = vec![None; lines.len()];
        for row in inserted {
            let slot = usize::try_from(row.position)
                .ok()
                .and_then(|p| ids.get_mut(p))
                .ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "order item returned unknown position {}",
                        row.position
                    ))
                })?;
            *slot = Some(row.id);
        }
        ids.into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| RepositoryError::DataCorruption("order item missing".to_string()))
    }

    async fn insert_item_add_ons(
        &mut self,
        item_id: OrderItemId,
        add_ons: &[AddOnLine],
    ) -> Result<(), RepositoryError> {
        let add_on_ids: Vec<i64> = add_ons.iter().map(|a| a.add_on_id.as_i64()).collect();
        let quantities: Vec<i32> = add_ons.iter().map(|a| a.quantity).collect();
        let prices: Vec<Decimal> = add_ons.iter().map(|a| a.unit_price.amount()).collect();

        sqlx::query(
            r"
            INSERT INTO order_item_add_on (order_item_id, add_on_id, quantity, unit_price)
            SELECT $1, t.add_on_id, t.quantity, t.unit_price
            FROM UNNEST($2::int8[], $3::int4[], $4::numeric[])
                AS t(add_on_id, quantity, unit_price)
            ",
        )
        .bind(item_id)
        .bind(&add_on_ids)
        .bind(&quantities)
        .bind(&prices)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }
}
