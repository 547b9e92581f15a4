mod admin;
mod health;
mod login;
mod orders;
mod products;
mod register;

use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    middleware::{admin_middleware, auth_middleware},
};

pub fn create_router() -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/auth/register", post(register::register_user))
        .route("/api/auth/login", post(login::login_user))
        .route("/api/products", get(products::list_products))
        .route("/api/products/{id}", get(products::get_product));

    let user = Router::new()
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/my-orders", get(orders::get_my_orders))
        .route_layer(from_fn(auth_middleware));

    let admin = Router::new()
        .route("/api/products", post(admin::create_product))
        .route(
            "/api/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/api/orders", get(orders::get_all_orders))
        .route("/api/orders/{id}/status", put(orders::update_order_status))
        .route("/api/orders/zero-stock", get(orders::get_zero_stock_products))
        .route(
            "/api/orders/zero-stock/{id}",
            delete(orders::delete_zero_stock_product),
        )
        .route_layer(from_fn(admin_middleware));

    Router::new().merge(public).merge(user).merge(admin)
}
