use std::collections::HashMap;

use sqlx::PgPool;

use crate::{error::Result, models::Product};

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn find_by_ids(pool: &PgPool, ids: &[i32]) -> Result<HashMap<i32, Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Product>> {
    let products =
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;

    Ok(products)
}

pub async fn find_zero_stock(pool: &PgPool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE stock = 0 ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(products)
}

/// Deletes the product only if its stock is still exactly zero when the
/// statement runs. Returns the number of rows removed, so the caller can
/// tell a stale zero-stock listing from a successful delete.
pub async fn delete_if_zero_stock(pool: &PgPool, id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND stock = 0")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
