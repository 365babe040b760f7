use thiserror::Error;

use crate::{
    db_types::{NewReview, Review},
    order_objects::Pagination,
};

/// Review persistence and seller-rating aggregation.
#[allow(async_fn_in_trait)]
pub trait ReviewManagement: Clone {
    /// Persists the review and, in the same transaction, recomputes the rated seller's aggregate
    /// rating as the arithmetic mean over all of that seller's reviews, rounded to two decimals.
    /// The aggregate is always recomputed from scratch, never updated incrementally.
    async fn insert_review(&self, review: NewReview) -> Result<Review, ReviewManagementError>;

    async fn review_exists(
        &self,
        reviewer_id: i64,
        product_id: i64,
        seller_id: i64,
    ) -> Result<bool, ReviewManagementError>;

    /// Reviews for a product, newest first.
    async fn fetch_reviews_for_product(
        &self,
        product_id: i64,
        pagination: &Pagination,
    ) -> Result<Vec<Review>, ReviewManagementError>;

    /// The seller's current aggregate rating, or `None` if the seller has no reviews yet.
    async fn seller_rating(&self, seller_id: i64) -> Result<Option<f64>, ReviewManagementError>;
}

#[derive(Debug, Clone, Error)]
pub enum ReviewManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A review for this product and seller already exists")]
    DuplicateReview,
    #[error("Seller {0} does not exist")]
    SellerNotFound(i64),
}

impl From<sqlx::Error> for ReviewManagementError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
