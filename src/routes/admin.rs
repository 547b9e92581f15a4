use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;
use rust_decimal::Decimal;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{Product, ProductRequest},
    queries::{admin_queries, products_queries},
};

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<Product>> {
    if payload.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name is required".to_string()));
    }

    if payload.price.is_none() {
        return Err(AppError::BadRequest("price is required".to_string()));
    }

    if payload
        .category
        .as_deref()
        .is_none_or(|c| c.trim().is_empty())
    {
        return Err(AppError::BadRequest("category is required".to_string()));
    }

    validate_product(&payload)?;

    let product = admin_queries::create_product(&state.db, &payload).await?;

    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<Product>> {
    validate_product(&payload)?;

    if products_queries::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Product with id {} not found",
            id
        )));
    }

    let product = admin_queries::update_product(&state.db, id, &payload).await?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let deleted = admin_queries::delete_product(&state.db, id).await?;

    if deleted == 0 {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn validate_product(payload: &ProductRequest) -> Result<()> {
    if let Some(price) = payload.price {
        if price < Decimal::ZERO {
            return Err(AppError::BadRequest("price cannot be negative".to_string()));
        }
    }

    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(AppError::BadRequest("stock cannot be negative".to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn request(price: Option<Decimal>, stock: Option<i32>) -> ProductRequest {
        ProductRequest {
            name: Some("Fresh Milk".to_string()),
            description: None,
            price,
            image_url: None,
            category: Some("dairy".to_string()),
            stock,
        }
    }

    #[test]
    fn non_negative_fields_pass() {
        assert!(validate_product(&request(Some(dec!(65)), Some(0))).is_ok());
        assert!(validate_product(&request(None, None)).is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        let result = validate_product(&request(Some(dec!(-1)), Some(10)));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn negative_stock_is_rejected() {
        let result = validate_product(&request(Some(dec!(65)), Some(-3)));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
