use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{CartItem, CreateOrderRequest, Order, OrderItem, OrderStatus, Product},
};

/// Reserves stock for a single line item inside the checkout transaction.
///
/// The availability check and the decrement are one conditional UPDATE, so
/// two concurrent checkouts for the last units cannot both pass: whichever
/// commits second matches zero rows and is rejected.
async fn reserve_stock(tx: &mut Transaction<'_, Postgres>, item: &CartItem) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products
         SET stock = stock - $1, updated_at = NOW()
         WHERE id = $2 AND stock >= $1
         RETURNING *",
    )
    .bind(item.quantity)
    .bind(item.product_id)
    .fetch_optional(&mut **tx)
    .await?;

    match product {
        Some(product) => Ok(product),
        None => {
            // Zero rows updated means the product is missing or under-stocked;
            // a second lookup tells the two apart.
            let existing = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
                .bind(item.product_id)
                .fetch_optional(&mut **tx)
                .await?;

            match existing {
                Some(product) => Err(AppError::BadRequest(format!(
                    "Insufficient stock for {}",
                    product.name
                ))),
                None => Err(AppError::NotFound(format!(
                    "Product not found: {}",
                    item.product_id
                ))),
            }
        }
    }
}

/// Reserves stock for every line item, then persists the order and its items.
///
/// All decrements and the order insert share one transaction: a failure on
/// any line item releases every decrement already applied, so an order is
/// never visible unless the full reservation committed. Line items are
/// priced from the product rows, not from the request.
///
/// Returns the persisted order, its items, and the touched product rows
/// (post-decrement) keyed by id, for response population.
pub async fn create_order_with_items(
    pool: &PgPool,
    user_id: i32,
    req: &CreateOrderRequest,
) -> Result<(Order, Vec<OrderItem>, HashMap<i32, Product>)> {
    let mut tx = pool.begin().await?;

    let mut total_amount = Decimal::ZERO;
    let mut products: HashMap<i32, Product> = HashMap::new();

    for item in &req.items {
        let product = reserve_stock(&mut tx, item).await?;
        total_amount += product.price * Decimal::from(item.quantity);
        products.insert(product.id, product);
    }

    let order_number = format!("fm_{}", Uuid::new_v4());

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (order_number, user_id, total_amount, payment_method,
         shipping_street, shipping_city, shipping_state, shipping_zip_code)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(&order_number)
    .bind(user_id)
    .bind(total_amount)
    .bind(req.payment_method)
    .bind(&req.shipping_address.street)
    .bind(&req.shipping_address.city)
    .bind(&req.shipping_address.state)
    .bind(&req.shipping_address.zip_code)
    .fetch_one(&mut *tx)
    .await?;

    let product_ids: Vec<i32> = req.items.iter().map(|i| i.product_id).collect();
    let quantities: Vec<i32> = req.items.iter().map(|i| i.quantity).collect();
    let prices: Vec<Decimal> = req
        .items
        .iter()
        .map(|i| products[&i.product_id].price)
        .collect();

    let items = sqlx::query_as::<_, OrderItem>(
        "INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase)
         SELECT $1, unnest($2::int[]), unnest($3::int[]), unnest($4::decimal[])
         RETURNING *",
    )
    .bind(order.id)
    .bind(&product_ids)
    .bind(&quantities)
    .bind(&prices)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((order, items, products))
}

/// No transition guard: any of the four states may replace any other.
pub async fn update_order_status(
    pool: &PgPool,
    id: i32,
    status: OrderStatus,
) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(status)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(order)
}

pub async fn get_user_orders(pool: &PgPool, user_id: i32) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

pub async fn get_all_orders(pool: &PgPool) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(orders)
}

pub async fn get_items_for_orders(pool: &PgPool, order_ids: &[i32]) -> Result<Vec<OrderItem>> {
    let items =
        sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ANY($1)")
            .bind(order_ids)
            .fetch_all(pool)
            .await?;

    Ok(items)
}
