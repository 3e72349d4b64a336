//! Database operations for the `products` table: priced records tied to a
//! search.

use arbscout_core::Marketplace;
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub search_id: i64,
    pub source: String,
    pub title: String,
    pub price: Option<f64>,
    pub supplier_cost: Option<f64>,
    pub profit: Option<f64>,
    pub margin: Option<f64>,
    pub url: Option<String>,
}

/// A product to persist. Cost, profit and margin are only known for retail
/// listings scored against a wholesale supplier cost.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub source: Marketplace,
    pub title: String,
    pub price: Option<f64>,
    pub supplier_cost: Option<f64>,
    pub profit: Option<f64>,
    pub margin: Option<f64>,
    pub url: Option<String>,
}

/// Inserts every product for `search_id` in one transaction.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails (including a `search_id`
/// that does not exist); nothing is written in that case.
pub async fn insert_products(
    pool: &SqlitePool,
    search_id: i64,
    products: &[NewProduct],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut written = 0u64;

    for product in products {
        let result = sqlx::query(
            "INSERT INTO products \
             (search_id, source, title, price, supplier_cost, profit, margin, url) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(search_id)
        .bind(product.source.as_str())
        .bind(&product.title)
        .bind(product.price)
        .bind(product.supplier_cost)
        .bind(product.profit)
        .bind(product.margin)
        .bind(product.url.as_deref())
        .execute(&mut *tx)
        .await?;
        written += result.rows_affected();
    }

    tx.commit().await?;
    tracing::debug!(search_id, written, "products recorded");
    Ok(written)
}

/// All products of one search, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_search_products(
    pool: &SqlitePool,
    search_id: i64,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, search_id, source, title, price, supplier_cost, profit, margin, url \
         FROM products \
         WHERE search_id = ?1 \
         ORDER BY id",
    )
    .bind(search_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
