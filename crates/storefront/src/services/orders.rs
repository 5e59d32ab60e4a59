//! Order placement.
//!
//! An order is persisted in four steps: buyer, order header, order items,
//! then item add-ons. The total is computed before the first write.
//!
//! [`create_order`] drives the steps against any [`OrderWriter`].
//! [`place_order`] runs them inside one database transaction so either every
//! row is written or none is.

use std::future::Future;

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use endulque_core::{
    AddOnLine, BuyerId, BuyerInfo, CartLine, NewOrder, OrderId, OrderItemId,
    OrderValidationError, OrderStatus, Price,
};

use crate::db::{PgOrderWriter, RepositoryError};

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order was rejected before anything was written.
    #[error("invalid order: {0}")]
    Validation(#[from] OrderValidationError),

    /// A write failed; nothing from this order was kept.
    #[error("failed to store order: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Identifiers of a stored order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub buyer_id: BuyerId,
    pub total: Price,
    /// One id per cart line, in cart order.
    pub item_ids: Vec<OrderItemId>,
}

/// Storage steps for one order.
///
/// Implementations write into whatever unit of work they were built on;
/// committing is the caller's business.
pub trait OrderWriter {
    /// Store the buyer and return its id.
    fn insert_buyer(
        &mut self,
        buyer: &BuyerInfo,
    ) -> impl Future<Output = Result<BuyerId, RepositoryError>> + Send;

    /// Store the order header.
    fn insert_order(
        &mut self,
        buyer_id: BuyerId,
        total: Price,
        status: OrderStatus,
    ) -> impl Future<Output = Result<OrderId, RepositoryError>> + Send;

    /// Store one item per line. The returned ids follow `lines` order.
    fn insert_items(
        &mut self,
        order_id: OrderId,
        lines: &[CartLine],
    ) -> impl Future<Output = Result<Vec<OrderItemId>, RepositoryError>> + Send;

    /// Store the add-ons of one item.
    fn insert_item_add_ons(
        &mut self,
        item_id: OrderItemId,
        add_ons: &[AddOnLine],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Validate `order` and write it through `writer`.
///
/// Nothing is written if validation fails. A failing step stops the
/// remaining steps.
///
/// # Errors
///
/// Returns `OrderError::Validation` for a rejected order and
/// `OrderError::Repository` if a write fails.
pub async fn create_order<W: OrderWriter + Send>(
    writer: &mut W,
    order: &NewOrder,
) -> Result<PlacedOrder, OrderError> {
    order.validate()?;
    let total = order.total();

    let buyer_id = writer.insert_buyer(&order.buyer).await?;
    let order_id = writer
        .insert_order(buyer_id, total, OrderStatus::default())
        .await?;

    let item_ids = writer.insert_items(order_id, &order.lines).await?;
    if item_ids.len() != order.lines.len() {
        return Err(RepositoryError::DataCorruption(format!(
            "expected {} order items, got {}",
            order.lines.len(),
            item_ids.len()
        ))
        .into());
    }

    for (item_id, line) in item_ids.iter().zip(&order.lines) {
        if !line.add_ons.is_empty() {
            writer.insert_item_add_ons(*item_id, &line.add_ons).await?;
        }
    }

    Ok(PlacedOrder {
        order_id,
        buyer_id,
        total,
        item_ids,
    })
}

/// Place `order` in a single transaction.
///
/// Validation runs before the transaction is opened. Any failure rolls back
/// every row written for this order.
///
/// # Errors
///
/// See [`create_order`]. Also fails if the transaction cannot be started or
/// committed.
#[instrument(skip(pool, order), fields(lines = order.lines.len(), add_ons = order.add_on_count()))]
pub async fn place_order(pool: &PgPool, order: &NewOrder) -> Result<PlacedOrder, OrderError> {
    order.validate()?;

    let mut tx = pool.begin().await?;
    let placed = create_order(&mut PgOrderWriter::new(&mut *tx), order).await?;
    tx.commit().await?;

    tracing::info!(
        order_id = %placed.order_id,
        total = %placed.total,
        "Order placed"
    );
    Ok(placed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use endulque_core::{AddOnId, ProductId, VariantId};

    use super::*;

    /// Step names, used to make a chosen step fail.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        Buyer,
        Order,
        Items,
        AddOns,
    }

    /// Records every row it is asked to write.
    #[derive(Default)]
    struct MemoryWriter {
        fail_at: Option<Step>,
        calls: Vec<Step>,
        buyers: Vec<BuyerInfo>,
        orders: Vec<(OrderId, BuyerId, Price, OrderStatus)>,
        items: Vec<(OrderItemId, OrderId, CartLine)>,
        add_ons: Vec<(OrderItemId, AddOnLine)>,
    }

    impl MemoryWriter {
        fn failing_at(step: Step) -> Self {
            Self {
                fail_at: Some(step),
                ..Self::default()
            }
        }

        fn step(&mut self, step: Step) -> Result<(), RepositoryError> {
            self.calls.push(step);
            if self.fail_at == Some(step) {
                return Err(RepositoryError::DataCorruption(format!("{step:?} failed")));
            }
            Ok(())
        }
    }

    impl OrderWriter for MemoryWriter {
        async fn insert_buyer(&mut self, buyer: &BuyerInfo) -> Result<BuyerId, RepositoryError> {
            self.step(Step::Buyer)?;
            self.buyers.push(buyer.clone());
            Ok(BuyerId::new(i64::try_from(self.buyers.len()).unwrap()))
        }

        async fn insert_order(
            &mut self,
            buyer_id: BuyerId,
            total: Price,
            status: OrderStatus,
        ) -> Result<OrderId, RepositoryError> {
            self.step(Step::Order)?;
            let id = OrderId::new(i64::try_from(self.orders.len()).unwrap() + 1);
            self.orders.push((id, buyer_id, total, status));
            Ok(id)
        }

        async fn insert_items(
            &mut self,
            order_id: OrderId,
            lines: &[CartLine],
        ) -> Result<Vec<OrderItemId>, RepositoryError> {
            self.step(Step::Items)?;
            let mut ids = Vec::new();
            for line in lines {
                let id = OrderItemId::new(i64::try_from(self.items.len()).unwrap() + 100);
                self.items.push((id, order_id, line.clone()));
                ids.push(id);
            }
            Ok(ids)
        }

        async fn insert_item_add_ons(
            &mut self,
            item_id: OrderItemId,
            add_ons: &[AddOnLine],
        ) -> Result<(), RepositoryError> {
            self.step(Step::AddOns)?;
            self.add_ons
                .extend(add_ons.iter().cloned().map(|a| (item_id, a)));
            Ok(())
        }
    }

    fn buyer() -> BuyerInfo {
        BuyerInfo {
            name: "Ani".to_string(),
            address: "Jl. A".to_string(),
            phone: "0811".to_string(),
        }
    }

    fn line(qty: i32, price: i64, add_ons: Vec<AddOnLine>) -> CartLine {
        CartLine {
            product_id: ProductId::new(1),
            variant_id: VariantId::new(1),
            quantity: qty,
            unit_price: Price::from_units(price),
            add_ons,
        }
    }

    fn add_on(id: i64, qty: i32, price: i64) -> AddOnLine {
        AddOnLine {
            add_on_id: AddOnId::new(id),
            quantity: qty,
            unit_price: Price::from_units(price),
        }
    }

    #[tokio::test]
    async fn test_single_line_with_add_on() {
        let order = NewOrder {
            buyer: buyer(),
            lines: vec![line(2, 10_000, vec![add_on(1, 1, 2_000)])],
        };
        let mut writer = MemoryWriter::default();
        let placed = create_order(&mut writer, &order).await.unwrap();

        assert_eq!(placed.total, Price::from_units(22_000));
        assert_eq!(writer.buyers, vec![buyer()]);
        assert_eq!(
            writer.orders,
            vec![(placed.order_id, placed.buyer_id, Price::from_units(22_000), OrderStatus::Pending)]
        );
        assert_eq!(writer.items.len(), 1);
        assert_eq!(writer.add_ons.len(), 1);
        assert_eq!(writer.add_ons[0].0, placed.item_ids[0]);
    }

    #[tokio::test]
    async fn test_rows_per_line_and_add_on() {
        let order = NewOrder {
            buyer: buyer(),
            lines: vec![
                line(1, 5_000, vec![add_on(1, 1, 500), add_on(2, 2, 1_000)]),
                line(3, 7_000, vec![]),
                line(1, 9_000, vec![add_on(3, 1, 1_500)]),
            ],
        };
        let mut writer = MemoryWriter::default();
        let placed = create_order(&mut writer, &order).await.unwrap();

        assert_eq!(writer.buyers.len(), 1);
        assert_eq!(writer.orders.len(), 1);
        assert_eq!(writer.items.len(), 3);
        assert_eq!(writer.add_ons.len(), order.add_on_count());
        assert!(writer.items.iter().all(|(_, oid, _)| *oid == placed.order_id));

        // Add-ons attach to the item of their own line.
        let third_item = placed.item_ids[2];
        let third: Vec<_> = writer
            .add_ons
            .iter()
            .filter(|(id, _)| *id == third_item)
            .map(|(_, a)| a.add_on_id)
            .collect();
        assert_eq!(third, vec![AddOnId::new(3)]);
        // A line without add-ons does not trigger an add-on write.
        assert_eq!(
            writer.calls,
            vec![Step::Buyer, Step::Order, Step::Items, Step::AddOns, Step::AddOns]
        );
        assert_eq!(placed.total, Price::from_units(5_000 + 500 + 2_000 + 21_000 + 9_000 + 1_500));
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let order = NewOrder {
            buyer: buyer(),
            lines: vec![],
        };
        let mut writer = MemoryWriter::default();
        let err = create_order(&mut writer, &order).await.unwrap_err();

        assert!(matches!(
            err,
            OrderError::Validation(OrderValidationError::EmptyCart)
        ));
        assert!(writer.calls.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_line_writes_nothing() {
        let order = NewOrder {
            buyer: buyer(),
            lines: vec![line(1, 1_000, vec![add_on(1, -1, 500)])],
        };
        let mut writer = MemoryWriter::default();
        assert!(matches!(
            create_order(&mut writer, &order).await,
            Err(OrderError::Validation(_))
        ));
        assert!(writer.calls.is_empty());
    }

    #[tokio::test]
    async fn test_failed_step_stops_later_steps() {
        let order = NewOrder {
            buyer: buyer(),
            lines: vec![line(1, 1_000, vec![add_on(1, 1, 500)])],
        };

        let mut writer = MemoryWriter::failing_at(Step::Order);
        let err = create_order(&mut writer, &order).await.unwrap_err();
        assert!(matches!(err, OrderError::Repository(_)));
        assert_eq!(writer.calls, vec![Step::Buyer, Step::Order]);
        assert!(writer.items.is_empty());

        let mut writer = MemoryWriter::failing_at(Step::Items);
        assert!(create_order(&mut writer, &order).await.is_err());
        assert_eq!(writer.calls, vec![Step::Buyer, Step::Order, Step::Items]);
        assert!(writer.add_ons.is_empty());
    }
}
