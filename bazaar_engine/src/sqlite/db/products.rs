use log::trace;
use sqlx::SqliteConnection;

use crate::{db_types::CatalogEntry, traits::CatalogError};

pub async fn fetch_product(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CatalogEntry>, sqlx::Error> {
    let entry = sqlx::query_as("SELECT id, seller_id, price, quantity FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(entry)
}

/// Guarded stock decrement. The `quantity >= $1` predicate makes the update a no-op when stock is
/// short, so concurrent decrements can never drive the quantity negative.
pub async fn decrement_quantity(
    product_id: i64,
    amount: i64,
    conn: &mut SqliteConnection,
) -> Result<(), CatalogError> {
    let result = sqlx::query(
        "UPDATE products SET quantity = quantity - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND quantity >= $1",
    )
    .bind(amount)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return match fetch_product(product_id, conn).await? {
            Some(_) => Err(CatalogError::InsufficientStock(product_id)),
            None => Err(CatalogError::ProductNotFound(product_id)),
        };
    }
    trace!("🛒️ Stock for product {product_id} reduced by {amount}");
    Ok(())
}
