use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        AdminOrderResponse, CreateOrderRequest, Order, OrderOwner, OrderResponse,
        PopulatedOrderItem, Product, UpdateStatusRequest,
    },
    queries::{order_queries, products_queries, user_queries},
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let user_id = extract_user_id(&claims)?;
    validate_order(&payload)?;

    let (order, items, products) =
        order_queries::create_order_with_items(&state.db, user_id, &payload).await?;

    tracing::info!(
        "Order {} placed by user {} for {} item(s)",
        order.order_number,
        user_id,
        items.len()
    );

    let items = items
        .into_iter()
        .map(|item| PopulatedOrderItem {
            product: products.get(&item.product_id).cloned(),
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price_at_purchase: item.price_at_purchase,
        })
        .collect();

    Ok((StatusCode::CREATED, Json(OrderResponse { order, items })))
}

pub async fn get_my_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OrderResponse>>> {
    let user_id = extract_user_id(&claims)?;
    let orders = order_queries::get_user_orders(&state.db, user_id).await?;

    let mut items_map = populate_items(&state.db, &orders).await?;

    let response = orders
        .into_iter()
        .map(|order| {
            let items = items_map.remove(&order.id).unwrap_or_default();
            OrderResponse { order, items }
        })
        .collect();

    Ok(Json(response))
}

pub async fn get_all_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminOrderResponse>>> {
    let orders = order_queries::get_all_orders(&state.db).await?;

    let mut items_map = populate_items(&state.db, &orders).await?;

    let user_ids: Vec<i32> = orders.iter().map(|o| o.user_id).collect();
    let users = user_queries::find_by_ids(&state.db, &user_ids).await?;

    let response = orders
        .into_iter()
        .map(|order| {
            let items = items_map.remove(&order.id).unwrap_or_default();
            let user = users.get(&order.user_id).map(|u| OrderOwner {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
            });
            AdminOrderResponse { order, user, items }
        })
        .collect();

    Ok(Json(response))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let order = order_queries::update_order_status(&state.db, id, payload.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}

pub async fn get_zero_stock_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let products = products_queries::find_zero_stock(&state.db).await?;

    Ok(Json(products))
}

pub async fn delete_zero_stock_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    if products_queries::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    // The stock condition is re-checked by the DELETE itself, so a product
    // restocked between the admin's listing and this call survives.
    let deleted = products_queries::delete_if_zero_stock(&state.db, id).await?;

    if deleted == 0 {
        return Err(AppError::BadRequest("Product still has stock".to_string()));
    }

    Ok(Json(json!({ "message": "Zero stock product deleted" })))
}

/// Batch-loads the items of every order, with their products, keyed by order id.
async fn populate_items(
    db: &PgPool,
    orders: &[Order],
) -> Result<HashMap<i32, Vec<PopulatedOrderItem>>> {
    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let items = order_queries::get_items_for_orders(db, &order_ids).await?;

    let product_ids: Vec<i32> = items.iter().map(|i| i.product_id).collect();
    let products = products_queries::find_by_ids(db, &product_ids).await?;

    let mut by_order: HashMap<i32, Vec<PopulatedOrderItem>> = HashMap::new();
    for item in items {
        by_order
            .entry(item.order_id)
            .or_default()
            .push(PopulatedOrderItem {
                product: products.get(&item.product_id).cloned(),
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_purchase: item.price_at_purchase,
            });
    }

    Ok(by_order)
}

fn validate_order(payload: &CreateOrderRequest) -> Result<()> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "Invalid quantity for product {}",
                item.product_id
            )));
        }
    }

    if payload.shipping_address.street.trim().is_empty() {
        return Err(AppError::BadRequest("Street is required".to_string()));
    }

    if payload.shipping_address.city.trim().is_empty() {
        return Err(AppError::BadRequest("City is required".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CartItem, PaymentMethod, ShippingAddress};

    fn address() -> ShippingAddress {
        ShippingAddress {
            street: "12 Market Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            zip_code: "411001".to_string(),
        }
    }

    fn order_with_items(items: Vec<CartItem>) -> CreateOrderRequest {
        CreateOrderRequest {
            items,
            payment_method: PaymentMethod::Cod,
            shipping_address: address(),
        }
    }

    #[test]
    fn valid_order_passes() {
        let order = order_with_items(vec![CartItem {
            product_id: 1,
            quantity: 2,
        }]);
        assert!(validate_order(&order).is_ok());
    }

    #[test]
    fn empty_cart_is_rejected() {
        let order = order_with_items(vec![]);
        assert!(matches!(
            validate_order(&order),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let order = order_with_items(vec![CartItem {
            product_id: 1,
            quantity: 0,
        }]);
        assert!(matches!(
            validate_order(&order),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let order = order_with_items(vec![
            CartItem {
                product_id: 1,
                quantity: 1,
            },
            CartItem {
                product_id: 2,
                quantity: -4,
            },
        ]);
        assert!(matches!(
            validate_order(&order),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn blank_street_is_rejected() {
        let mut order = order_with_items(vec![CartItem {
            product_id: 1,
            quantity: 1,
        }]);
        order.shipping_address.street = "  ".to_string();
        assert!(matches!(
            validate_order(&order),
            Err(AppError::BadRequest(_))
        ));
    }
}
