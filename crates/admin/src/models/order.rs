//! Order views for the admin panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use endulque_core::{
    AddOnId, BuyerId, OrderId, OrderItemAddOnId, OrderItemId, OrderStatus, Price, ProductId,
    VariantId,
};

/// One row of the order list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub total_price: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Order header with its buyer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderHeader {
    pub id: OrderId,
    pub buyer_id: BuyerId,
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_phone: String,
    pub total_price: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An add-on of an order item. Names are `None` once the add-on is deleted
/// from the catalog; the price paid is kept.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemAddOnDetail {
    pub id: OrderItemAddOnId,
    pub order_item_id: OrderItemId,
    pub add_on_id: Option<AddOnId>,
    pub add_on_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Price,
}

/// One item of an order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemDetail {
    pub id: OrderItemId,
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub variant_id: Option<VariantId>,
    pub variant_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Price,
    #[sqlx(skip)]
    pub add_ons: Vec<OrderItemAddOnDetail>,
}

impl OrderItemDetail {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
            + self
                .add_ons
                .iter()
                .map(|a| a.unit_price.times(a.quantity))
                .sum::<Price>()
    }
}

/// Full order with items and add-ons.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: OrderHeader,
    pub items: Vec<OrderItemDetail>,
}

impl OrderDetail {
    /// Attach add-on rows to their items.
    #[must_use]
    pub fn assemble(
        header: OrderHeader,
        mut items: Vec<OrderItemDetail>,
        add_ons: Vec<OrderItemAddOnDetail>,
    ) -> Self {
        for add_on in add_ons {
            if let Some(item) = items.iter_mut().find(|i| i.id == add_on.order_item_id) {
                item.add_ons.push(add_on);
            }
        }
        Self { header, items }
    }

    /// Total recomputed from the stored rows.
    #[must_use]
    pub fn items_total(&self) -> Price {
        self.items.iter().map(OrderItemDetail::subtotal).sum()
    }
}

/// Order list filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Status change request.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> OrderHeader {
        OrderHeader {
            id: OrderId::new(1),
            buyer_id: BuyerId::new(1),
            buyer_name: "Ani".to_string(),
            buyer_address: "Jl. A".to_string(),
            buyer_phone: "0811".to_string(),
            total_price: Price::from_units(22_000),
            status: OrderStatus::Pending,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn item(id: i64) -> OrderItemDetail {
        OrderItemDetail {
            id: OrderItemId::new(id),
            product_id: Some(ProductId::new(1)),
            product_name: Some("Bolu".to_string()),
            variant_id: Some(VariantId::new(1)),
            variant_name: Some("Kecil".to_string()),
            quantity: 2,
            unit_price: Price::from_units(10_000),
            add_ons: Vec::new(),
        }
    }

    #[test]
    fn test_assemble_links_add_ons_to_items() {
        let add_on = OrderItemAddOnDetail {
            id: OrderItemAddOnId::new(1),
            order_item_id: OrderItemId::new(11),
            add_on_id: None,
            add_on_name: None,
            quantity: 1,
            unit_price: Price::from_units(2_000),
        };
        let detail = OrderDetail::assemble(header(), vec![item(10), item(11)], vec![add_on]);

        assert!(detail.items[0].add_ons.is_empty());
        assert_eq!(detail.items[1].add_ons.len(), 1);
        assert_eq!(detail.items[1].subtotal(), Price::from_units(22_000));
        assert_eq!(detail.items_total(), Price::from_units(42_000));
    }

    #[test]
    fn test_detail_serializes_flat_header() {
        let detail = OrderDetail::assemble(header(), vec![], vec![]);
        let json = serde_json::to_value(&detail).unwrap_or_default();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["buyer_name"], "Ani");
    }
}
