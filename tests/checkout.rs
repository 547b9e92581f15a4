//! Checkout and back-office behavior against a live Postgres.
//!
//! These run through `#[sqlx::test]`, which provisions a throwaway database
//! per test from DATABASE_URL and applies ./migrations. They are ignored by
//! default so the suite passes on machines without Postgres:
//!
//!     DATABASE_URL=postgres://... cargo test -- --ignored

use freshmart_back::error::AppError;
use freshmart_back::models::{
    CartItem, CreateOrderRequest, OrderStatus, PaymentMethod, ShippingAddress,
};
use freshmart_back::queries::{order_queries, products_queries};
use rust_decimal::{Decimal, dec};
use sqlx::PgPool;

async fn seed_user(pool: &PgPool) -> i32 {
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO users (email, name, password)
         VALUES ('shopper@example.com', 'Shopper', 'x') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_product(pool: &PgPool, name: &str, price: Decimal, stock: i32) -> i32 {
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO products (name, price, category, stock)
         VALUES ($1, $2, 'fruits', $3) RETURNING id",
    )
    .bind(name)
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn stock_of(pool: &PgPool, id: i32) -> i32 {
    sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn order_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn order_request(items: Vec<CartItem>) -> CreateOrderRequest {
    CreateOrderRequest {
        items,
        payment_method: PaymentMethod::Cod,
        shipping_address: ShippingAddress {
            street: "12 Market Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            zip_code: "411001".to_string(),
        },
    }
}

fn item(product_id: i32, quantity: i32) -> CartItem {
    CartItem {
        product_id,
        quantity,
    }
}

#[sqlx::test]
#[ignore = "needs a running Postgres (set DATABASE_URL)"]
async fn checkout_decrements_stock_and_persists_pending_order(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let product_id = seed_product(&pool, "Fresh Bananas", dec!(60), 100).await;

    let (order, items, _) =
        order_queries::create_order_with_items(&pool, user_id, &order_request(vec![item(product_id, 2)]))
            .await
            .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, dec!(120));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].price_at_purchase, dec!(60));
    assert_eq!(stock_of(&pool, product_id).await, 98);
}

#[sqlx::test]
#[ignore = "needs a running Postgres (set DATABASE_URL)"]
async fn total_is_priced_from_products_not_the_client(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let bananas = seed_product(&pool, "Fresh Bananas", dec!(60), 100).await;
    let cheese = seed_product(&pool, "Cheddar Cheese", dec!(180), 30).await;

    let (order, _, _) = order_queries::create_order_with_items(
        &pool,
        user_id,
        &order_request(vec![item(bananas, 3), item(cheese, 1)]),
    )
    .await
    .unwrap();

    assert_eq!(order.total_amount, dec!(360));
}

#[sqlx::test]
#[ignore = "needs a running Postgres (set DATABASE_URL)"]
async fn missing_product_aborts_the_whole_reservation(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let product_id = seed_product(&pool, "Fresh Bananas", dec!(60), 100).await;

    let err = order_queries::create_order_with_items(
        &pool,
        user_id,
        &order_request(vec![item(product_id, 2), item(999_999, 1)]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(err.to_string().contains("999999"));

    // The earlier line item's decrement must be rolled back, not left applied.
    assert_eq!(stock_of(&pool, product_id).await, 100);
    assert_eq!(order_count(&pool).await, 0);
}

#[sqlx::test]
#[ignore = "needs a running Postgres (set DATABASE_URL)"]
async fn insufficient_stock_aborts_and_names_the_product(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let bananas = seed_product(&pool, "Fresh Bananas", dec!(60), 100).await;
    let bread = seed_product(&pool, "White Bread", dec!(45), 3).await;

    let err = order_queries::create_order_with_items(
        &pool,
        user_id,
        &order_request(vec![item(bananas, 2), item(bread, 5)]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(err.to_string().contains("White Bread"));

    assert_eq!(stock_of(&pool, bananas).await, 100);
    assert_eq!(stock_of(&pool, bread).await, 3);
    assert_eq!(order_count(&pool).await, 0);
}

#[sqlx::test]
#[ignore = "needs a running Postgres (set DATABASE_URL)"]
async fn duplicate_lines_for_one_product_share_its_stock(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let product_id = seed_product(&pool, "Croissants", dec!(150), 5).await;

    // 3 + 3 exceeds the 5 in stock even though each line alone fits.
    let err = order_queries::create_order_with_items(
        &pool,
        user_id,
        &order_request(vec![item(product_id, 3), item(product_id, 3)]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(stock_of(&pool, product_id).await, 5);
}

#[sqlx::test]
#[ignore = "needs a running Postgres (set DATABASE_URL)"]
async fn concurrent_checkouts_cannot_oversell(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let product_id = seed_product(&pool, "Basmati Rice", dec!(450), 5).await;

    // Both requests want the full remaining stock.
    let first_request = order_request(vec![item(product_id, 5)]);
    let second_request = order_request(vec![item(product_id, 5)]);
    let (first, second) = tokio::join!(
        order_queries::create_order_with_items(&pool, user_id, &first_request),
        order_queries::create_order_with_items(&pool, user_id, &second_request),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of the two rivals may win");

    assert_eq!(stock_of(&pool, product_id).await, 0);
    assert_eq!(order_count(&pool).await, 1);
}

#[sqlx::test]
#[ignore = "needs a running Postgres (set DATABASE_URL)"]
async fn status_update_has_no_transition_guard(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let product_id = seed_product(&pool, "Green Tea", dec!(180), 45).await;

    let (order, _, _) =
        order_queries::create_order_with_items(&pool, user_id, &order_request(vec![item(product_id, 1)]))
            .await
            .unwrap();

    let delivered = order_queries::update_order_status(&pool, order.id, OrderStatus::Delivered)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    // Backwards is allowed too.
    let pending = order_queries::update_order_status(&pool, order.id, OrderStatus::Pending)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pending.status, OrderStatus::Pending);
}

#[sqlx::test]
#[ignore = "needs a running Postgres (set DATABASE_URL)"]
async fn status_update_for_unknown_order_is_none(pool: PgPool) {
    let updated = order_queries::update_order_status(&pool, 424_242, OrderStatus::Shipped)
        .await
        .unwrap();
    assert!(updated.is_none());
}

#[sqlx::test]
#[ignore = "needs a running Postgres (set DATABASE_URL)"]
async fn zero_stock_delete_rechecks_stock_at_delete_time(pool: PgPool) {
    let depleted = seed_product(&pool, "Toothpaste", dec!(65), 0).await;
    let restocked = seed_product(&pool, "Shampoo", dec!(220), 3).await;

    let listed = products_queries::find_zero_stock(&pool).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, depleted);

    assert_eq!(products_queries::delete_if_zero_stock(&pool, depleted).await.unwrap(), 1);
    assert!(products_queries::find_by_id(&pool, depleted).await.unwrap().is_none());

    // A product that picked up stock since the listing must survive.
    assert_eq!(products_queries::delete_if_zero_stock(&pool, restocked).await.unwrap(), 0);
    assert!(products_queries::find_by_id(&pool, restocked).await.unwrap().is_some());
}
