//! Menu to cart to order, end to end, against an in-memory order store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::NaiveDate;
use endulque_core::{
    AddOnId, AddOnLine, BuyerId, BuyerInfo, CartLine, CategoryId, OrderId, OrderItemId,
    OrderStatus, Price, ProductId, VariantId,
};
use endulque_storefront::db::RepositoryError;
use endulque_storefront::models::{
    CartError, CartItem, Menu, MenuAddOn, MenuProduct, MenuVariant, SessionCart,
};
use endulque_storefront::routes::checkout::{CheckoutRequest, build_order};
use endulque_storefront::services::{OrderError, OrderWriter, create_order};

/// Rows written for one order.
#[derive(Default)]
struct Ledger {
    buyers: Vec<BuyerInfo>,
    orders: Vec<(OrderId, BuyerId, Price, OrderStatus)>,
    items: Vec<(OrderItemId, OrderId, CartLine)>,
    add_ons: Vec<(OrderItemId, AddOnLine)>,
    fail_add_ons: bool,
}

impl OrderWriter for Ledger {
    async fn insert_buyer(&mut self, buyer: &BuyerInfo) -> Result<BuyerId, RepositoryError> {
        self.buyers.push(buyer.clone());
        Ok(BuyerId::new(7))
    }

    async fn insert_order(
        &mut self,
        buyer_id: BuyerId,
        total: Price,
        status: OrderStatus,
    ) -> Result<OrderId, RepositoryError> {
        let id = OrderId::new(501);
        self.orders.push((id, buyer_id, total, status));
        Ok(id)
    }

    async fn insert_items(
        &mut self,
        order_id: OrderId,
        lines: &[CartLine],
    ) -> Result<Vec<OrderItemId>, RepositoryError> {
        let mut ids = Vec::new();
        for line in lines {
            let id = OrderItemId::new(1_000 + i64::try_from(self.items.len()).unwrap());
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
        if self.fail_add_ons {
            return Err(RepositoryError::DataCorruption("add-on write refused".to_string()));
        }
        self.add_ons
            .extend(add_ons.iter().cloned().map(|a| (item_id, a)));
        Ok(())
    }
}

fn bolu(variant_price: i64, cheese_price: i64) -> MenuProduct {
    let id = ProductId::new(1);
    MenuProduct {
        id,
        category_id: Some(CategoryId::new(1)),
        name: "Bolu Pandan".to_string(),
        description: "Soft pandan sponge".to_string(),
        image_url: None,
        variants: vec![
            MenuVariant {
                id: VariantId::new(10),
                product_id: id,
                name: "Loyang 20cm".to_string(),
                price: Price::from_units(variant_price),
            },
            MenuVariant {
                id: VariantId::new(11),
                product_id: id,
                name: "Loyang 24cm".to_string(),
                price: Price::from_units(variant_price + 20_000),
            },
        ],
        add_ons: vec![
            MenuAddOn {
                id: AddOnId::new(20),
                product_id: id,
                name: "Keju".to_string(),
                price: Price::from_units(cheese_price),
            },
            MenuAddOn {
                id: AddOnId::new(21),
                product_id: id,
                name: "Kartu ucapan".to_string(),
                price: Price::from_units(1_500),
            },
        ],
        ready_dates: vec![NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()],
    }
}

fn menu(variant_price: i64, cheese_price: i64) -> Menu {
    Menu::assemble(
        vec![(CategoryId::new(1), "Kue".to_string())],
        vec![bolu(variant_price, cheese_price)],
    )
}

fn checkout(phone: &str) -> CheckoutRequest {
    CheckoutRequest {
        name: "Ani".to_string(),
        address: "Jl. Melati 5, Bandung".to_string(),
        phone: phone.to_string(),
    }
}

#[tokio::test]
async fn test_cart_to_order_totals_and_rows() {
    let menu = menu(10_000, 2_000);
    let product = menu.product(ProductId::new(1)).unwrap();

    let mut cart = SessionCart::default();
    cart.add(CartItem::resolve(product, VariantId::new(10), 2, &[(AddOnId::new(20), 1)]).unwrap())
        .unwrap();
    assert_eq!(cart.total(), Price::from_units(22_000));

    let order = build_order(checkout("0812-3456-7890"), &cart).unwrap();
    let mut ledger = Ledger::default();
    let placed = create_order(&mut ledger, &order).await.unwrap();

    assert_eq!(placed.total, Price::from_units(22_000));
    assert_eq!(placed.order_id, OrderId::new(501));
    assert_eq!(ledger.buyers.len(), 1);
    assert_eq!(ledger.buyers[0].name, "Ani");
    assert_eq!(
        ledger.orders,
        vec![(OrderId::new(501), BuyerId::new(7), Price::from_units(22_000), OrderStatus::Pending)]
    );
    assert_eq!(ledger.items.len(), 1);
    assert_eq!(ledger.items[0].2.unit_price, Price::from_units(10_000));
    assert_eq!(ledger.add_ons.len(), 1);
    assert_eq!(ledger.add_ons[0].0, placed.item_ids[0]);
    assert_eq!(ledger.add_ons[0].1.add_on_id, AddOnId::new(20));
}

#[tokio::test]
async fn test_checkout_reprices_against_current_menu() {
    let old_menu = menu(10_000, 2_000);
    let mut cart = SessionCart::default();
    let product = old_menu.product(ProductId::new(1)).unwrap();
    cart.add(CartItem::resolve(product, VariantId::new(10), 1, &[(AddOnId::new(20), 2)]).unwrap())
        .unwrap();

    // The owner raised prices after the item went into the cart.
    let cart = cart.reprice(&menu(12_000, 2_500)).unwrap();
    let order = build_order(checkout("081234567890"), &cart).unwrap();
    let placed = create_order(&mut Ledger::default(), &order).await.unwrap();

    assert_eq!(placed.total, Price::from_units(12_000 + 5_000));
}

#[test]
fn test_reprice_rejects_removed_product() {
    let menu = menu(10_000, 2_000);
    let mut cart = SessionCart::default();
    cart.add(
        CartItem::resolve(menu.product(ProductId::new(1)).unwrap(), VariantId::new(11), 1, &[])
            .unwrap(),
    )
    .unwrap();

    let empty = Menu::assemble(vec![(CategoryId::new(1), "Kue".to_string())], vec![]);
    assert_eq!(
        cart.reprice(&empty).unwrap_err(),
        CartError::ProductUnavailable(ProductId::new(1))
    );
}

#[tokio::test]
async fn test_several_lines_keep_add_ons_with_their_item() {
    let menu = menu(10_000, 2_000);
    let product = menu.product(ProductId::new(1)).unwrap();

    let mut cart = SessionCart::default();
    cart.add(CartItem::resolve(product, VariantId::new(10), 1, &[]).unwrap())
        .unwrap();
    cart.add(
        CartItem::resolve(
            product,
            VariantId::new(11),
            3,
            &[(AddOnId::new(21), 1), (AddOnId::new(20), 3)],
        )
        .unwrap(),
    )
    .unwrap();

    let order = build_order(checkout("+62 812 3456 7890"), &cart).unwrap();
    let mut ledger = Ledger::default();
    let placed = create_order(&mut ledger, &order).await.unwrap();

    assert_eq!(placed.item_ids.len(), 2);
    assert_eq!(ledger.items.len(), 2);
    assert!(ledger.add_ons.iter().all(|(id, _)| *id == placed.item_ids[1]));
    assert_eq!(ledger.add_ons.len(), 2);
    // 10_000 + 3 * 30_000 + 1_500 + 3 * 2_000
    assert_eq!(placed.total, Price::from_units(107_500));
    assert_eq!(placed.total, cart.total());
}

#[tokio::test]
async fn test_failed_add_on_write_surfaces_as_repository_error() {
    let menu = menu(10_000, 2_000);
    let product = menu.product(ProductId::new(1)).unwrap();
    let mut cart = SessionCart::default();
    cart.add(CartItem::resolve(product, VariantId::new(10), 1, &[(AddOnId::new(20), 1)]).unwrap())
        .unwrap();
    let order = build_order(checkout("081234567890"), &cart).unwrap();

    let mut ledger = Ledger {
        fail_add_ons: true,
        ..Ledger::default()
    };
    let err = create_order(&mut ledger, &order).await.unwrap_err();
    assert!(matches!(err, OrderError::Repository(_)));
}

#[tokio::test]
async fn test_empty_cart_is_rejected_before_any_write() {
    let order = build_order(checkout("081234567890"), &SessionCart::default()).unwrap();
    let mut ledger = Ledger::default();

    assert!(matches!(
        create_order(&mut ledger, &order).await,
        Err(OrderError::Validation(_))
    ));
    assert!(ledger.buyers.is_empty());
    assert!(ledger.orders.is_empty());
}

#[test]
fn test_bad_phone_is_rejected_at_checkout() {
    let menu = menu(10_000, 2_000);
    let mut cart = SessionCart::default();
    cart.add(
        CartItem::resolve(menu.product(ProductId::new(1)).unwrap(), VariantId::new(10), 1, &[])
            .unwrap(),
    )
    .unwrap();

    assert!(build_order(checkout("call me"), &cart).is_err());
}
