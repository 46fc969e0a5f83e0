//! `PgOrderStore` against a real database.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - Migrations applied (`cargo run -p quickcart-cli -- migrate`)
//! - `DATABASE_URL` pointing at it
//!
//! Run with: cargo test -p quickcart-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use quickcart_core::{
    Cart, CartLine, CustomerInfo, Money, NewOrder, OrderStatus, ProductId, Quantity, UserId,
};
use quickcart_order_service::{OrderStore, PgOrderStore, RepositoryError, db};
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

async fn store() -> PgOrderStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    PgOrderStore::new(pool)
}

/// A user id no other test run will collide with.
fn unique_user() -> UserId {
    UserId::new(format!("test-{}", Uuid::new_v4()))
}

fn new_order(user_id: UserId) -> NewOrder {
    let cart = Cart::from_lines([
        CartLine::new("P1", "Phone", Money::from_units(500), "")
            .with_quantity(Quantity::new(2).unwrap()),
        CartLine::new("P2", "Case", Money::from_units(400), ""),
    ]);
    NewOrder::from_cart(
        user_id,
        &cart,
        Money::from_units(99),
        Some(CustomerInfo {
            name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            address: "12 MG Road".to_string(),
            postal_code: "560001".to_string(),
        }),
    )
    .unwrap()
}

async fn count_rows(pool: &PgPool, user_id: &UserId) -> (i64, i64) {
    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id.as_str())
        .fetch_one(pool)
        .await
        .unwrap();
    let items: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM order_items i JOIN orders o ON o.id = i.order_id WHERE o.user_id = $1",
    )
    .bind(user_id.as_str())
    .fetch_one(pool)
    .await
    .unwrap();
    (orders, items)
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_create_order_round_trip() {
    let store = store().await;
    let user = unique_user();

    let order = store.create_order(new_order(user.clone())).await.unwrap();
    assert_eq!(order.total, Money::from_units(1499));
    assert_eq!(order.status, OrderStatus::Processing);

    let lines = store.order_lines(&order.id).await.unwrap();
    assert_eq!(lines.len(), 2);

    let history = store.orders_for_user(&user).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, order.id);

    let admin = store.admin_orders(Some(OrderStatus::Processing)).await.unwrap();
    let row = admin.iter().find(|o| o.order.id == order.id).unwrap();
    assert_eq!(row.item_count, 2);
    assert_eq!(row.customer_name.as_deref(), Some("Asha Rao"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_failed_line_insert_rolls_back_order() {
    let store = store().await;
    let user = unique_user();

    // Postgres refuses NUL bytes in text, so the line insert fails after the
    // order row is already written inside the transaction
    let mut order = new_order(user.clone());
    order.lines[1].product_id = ProductId::new("P2\0");

    let result = store.create_order(order).await;

    assert!(matches!(result, Err(RepositoryError::Database(_))));
    assert_eq!(count_rows(store.pool(), &user).await, (0, 0));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_status_update_rules() {
    let store = store().await;
    let order = store.create_order(new_order(unique_user())).await.unwrap();

    let shipped = store
        .update_status(&order.id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    store
        .update_status(&order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    let err = store
        .update_status(&order.id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let err = store
        .update_status(&quickcart_core::OrderId::new("missing"), OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
