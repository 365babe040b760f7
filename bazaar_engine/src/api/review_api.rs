use std::fmt::Debug;

use log::*;

use crate::{
    api::errors::ReviewApiError,
    authz::{capability_for, OrderCapability},
    db_types::{NewReview, OrderStatus, Principal, Review},
    order_objects::Pagination,
    traits::{OrderManagement, ReviewManagement, ReviewManagementError},
};

/// `ReviewApi` closes the transaction loop: once an order completes, its buyer can rate the
/// products they bought, and each accepted review recomputes the seller's aggregate rating.
pub struct ReviewApi<B> {
    db: B,
}

impl<B> Debug for ReviewApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReviewApi")
    }
}

impl<B> ReviewApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

/// The review payload as submitted against an order.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub product_id: i64,
    pub seller_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

impl<B> ReviewApi<B>
where B: ReviewManagement + OrderManagement
{
    /// Submit a review against a completed order.
    ///
    /// The actor must be the order's buyer (or an admin); the order must be `Completed`; the rating
    /// must lie in [1, 5]; the reviewed product must have been an item of the order and the seller
    /// must match the order's seller; and the (reviewer, product, seller) triple must not have been
    /// reviewed before. All checks run before anything is written.
    pub async fn submit_review(
        &self,
        actor: &Principal,
        order_id: i64,
        request: ReviewRequest,
    ) -> Result<Review, ReviewApiError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(ReviewApiError::OrderNotFound(order_id))?;
        match capability_for(actor, &order) {
            OrderCapability::Buyer | OrderCapability::Admin => {},
            _ => return Err(ReviewApiError::NotPermitted("Only the buyer may review an order".into())),
        }
        if order.status != OrderStatus::Completed {
            return Err(ReviewApiError::OrderNotCompleted);
        }
        if !(1..=5).contains(&request.rating) {
            return Err(ReviewApiError::InvalidRating(request.rating));
        }
        if self.db.review_exists(actor.id, request.product_id, request.seller_id).await? {
            return Err(ReviewManagementError::DuplicateReview.into());
        }
        let items = self.db.fetch_order_items(order_id).await?;
        if !items.iter().any(|item| item.product_id == request.product_id) {
            return Err(ReviewApiError::ProductNotInOrder(request.product_id));
        }
        if request.seller_id != order.seller_id {
            return Err(ReviewApiError::SellerMismatch);
        }
        let review = NewReview {
            reviewer_id: actor.id,
            seller_id: request.seller_id,
            product_id: request.product_id,
            rating: request.rating,
            comment: request.comment,
        };
        let review = self.db.insert_review(review).await?;
        debug!("⭐️ Review {} accepted for product {} from {}", review.id, review.product_id, actor.username);
        Ok(review)
    }

    /// A product's reviews, newest first. This listing is public.
    pub async fn product_reviews(&self, product_id: i64, pagination: Pagination) -> Result<Vec<Review>, ReviewApiError> {
        let reviews = self.db.fetch_reviews_for_product(product_id, &pagination).await?;
        Ok(reviews)
    }

    /// The seller's current aggregate rating, if they have any reviews.
    pub async fn seller_rating(&self, seller_id: i64) -> Result<Option<f64>, ReviewApiError> {
        let rating = self.db.seller_rating(seller_id).await?;
        Ok(rating)
    }
}
