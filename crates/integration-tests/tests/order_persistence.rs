//! Order placement against a real database.
//!
//! Ignored by default. Migrations run on start, so any scratch database will do:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/endulque_test \
//!     cargo test -p endulque-integration-tests --test order_persistence -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;

use endulque_core::{
    AddOnId, AddOnLine, BuyerInfo, CartLine, NewOrder, Price, ProductId, VariantId,
};
use endulque_integration_tests::owner_id;
use endulque_storefront::services::{OrderError, place_order};

async fn migrated_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::migrate!("../../migrations").run(&pool).await.unwrap();
    pool
}

/// A fresh product with one variant and one add-on.
async fn seed_product(pool: &PgPool) -> (ProductId, VariantId, AddOnId) {
    let product: ProductId = sqlx::query_scalar(
        "INSERT INTO product (owner_id, name) VALUES ($1, 'Bolu Pandan') RETURNING id",
    )
    .bind(owner_id())
    .fetch_one(pool)
    .await
    .unwrap();
    let variant: VariantId = sqlx::query_scalar(
        "INSERT INTO variant (product_id, name, price) VALUES ($1, 'Loyang 20cm', 85000) RETURNING id",
    )
    .bind(product)
    .fetch_one(pool)
    .await
    .unwrap();
    let add_on: AddOnId = sqlx::query_scalar(
        "INSERT INTO add_on (product_id, name, price) VALUES ($1, 'Lilin', 5000) RETURNING id",
    )
    .bind(product)
    .fetch_one(pool)
    .await
    .unwrap();
    (product, variant, add_on)
}

fn buyer(name: &str) -> BuyerInfo {
    BuyerInfo {
        name: name.to_string(),
        address: "Jl. Melati 7".to_string(),
        phone: "081234567890".to_string(),
    }
}

fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn buyer_rows(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM buyer WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn order_rows(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders o JOIN buyer b ON b.id = o.buyer_id WHERE b.name = $1",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_failed_add_on_insert_keeps_no_rows() {
    let pool = migrated_pool().await;
    let (product, variant, add_on) = seed_product(&pool).await;
    let name = unique_name("rollback");

    // The second add-on id does not exist, so the last write step fails on
    // its foreign key after buyer, order and items are already written.
    let order = NewOrder {
        buyer: buyer(&name),
        lines: vec![CartLine {
            product_id: product,
            variant_id: variant,
            quantity: 1,
            unit_price: Price::from_units(85_000),
            add_ons: vec![
                AddOnLine {
                    add_on_id: add_on,
                    quantity: 1,
                    unit_price: Price::from_units(5_000),
                },
                AddOnLine {
                    add_on_id: AddOnId::new(i64::MAX),
                    quantity: 1,
                    unit_price: Price::from_units(5_000),
                },
            ],
        }],
    };

    let err = place_order(&pool, &order).await.unwrap_err();
    assert!(matches!(err, OrderError::Repository(_)), "{err:?}");
    assert_eq!(buyer_rows(&pool, &name).await, 0);
    assert_eq!(order_rows(&pool, &name).await, 0);
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_items_and_add_ons_keep_cart_order() {
    let pool = migrated_pool().await;
    let (product, variant, add_on) = seed_product(&pool).await;
    let name = unique_name("placed");

    let line = |quantity: i32, add_on_quantity: Option<i32>| CartLine {
        product_id: product,
        variant_id: variant,
        quantity,
        unit_price: Price::from_units(85_000),
        add_ons: add_on_quantity
            .map(|q| AddOnLine {
                add_on_id: add_on,
                quantity: q,
                unit_price: Price::from_units(5_000),
            })
            .into_iter()
            .collect(),
    };
    let order = NewOrder {
        buyer: buyer(&name),
        lines: vec![line(3, None), line(1, Some(2)), line(2, Some(4))],
    };

    let placed = place_order(&pool, &order).await.unwrap();
    assert_eq!(placed.total, order.total());
    assert_eq!(placed.item_ids.len(), 3);
    assert_eq!(order_rows(&pool, &name).await, 1);

    // Each returned id carries the quantity of the cart line at its index.
    for (item_id, line) in placed.item_ids.iter().zip(&order.lines) {
        let (position, quantity): (i32, i32) =
            sqlx::query_as("SELECT position, quantity FROM order_item WHERE id = $1")
                .bind(*item_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(quantity, line.quantity);

        let add_on_quantities: Vec<i32> = sqlx::query_scalar(
            "SELECT quantity FROM order_item_add_on WHERE order_item_id = $1",
        )
        .bind(*item_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        let expected: Vec<i32> = line.add_ons.iter().map(|a| a.quantity).collect();
        assert_eq!(add_on_quantities, expected, "item at position {position}");
    }
}
