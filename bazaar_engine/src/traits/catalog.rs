use thiserror::Error;

use crate::db_types::CatalogEntry;

/// The boundary to the product catalog. The engine only ever reads a product's seller, price and
/// stock level, and decrements stock; catalog CRUD and moderation live elsewhere.
#[allow(async_fn_in_trait)]
pub trait CatalogGateway: Clone {
    async fn lookup_product(&self, product_id: i64) -> Result<Option<CatalogEntry>, CatalogError>;

    /// Decrements available stock by `amount`, failing with [`CatalogError::InsufficientStock`] if
    /// fewer than `amount` units remain. The decrement is guarded so that concurrent calls can
    /// never drive stock negative.
    async fn decrement_quantity(&self, product_id: i64, amount: i64) -> Result<(), CatalogError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(i64),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
