use sqlx::SqliteConnection;

use crate::{
    db_types::{NewReview, Review},
    order_objects::Pagination,
    traits::ReviewManagementError,
};

pub async fn insert_review(review: NewReview, conn: &mut SqliteConnection) -> Result<Review, ReviewManagementError> {
    let review = sqlx::query_as(
        r#"
            INSERT INTO reviews (reviewer_id, seller_id, product_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(review.reviewer_id)
    .bind(review.seller_id)
    .bind(review.product_id)
    .bind(review.rating)
    .bind(review.comment)
    .fetch_one(conn)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => ReviewManagementError::DuplicateReview,
        _ => ReviewManagementError::DatabaseError(e.to_string()),
    })?;
    Ok(review)
}

pub async fn review_exists(
    reviewer_id: i64,
    product_id: i64,
    seller_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM reviews WHERE reviewer_id = $1 AND product_id = $2 AND seller_id = $3")
            .bind(reviewer_id)
            .bind(product_id)
            .bind(seller_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

pub async fn fetch_ratings_for_seller(seller_id: i64, conn: &mut SqliteConnection) -> Result<Vec<i64>, sqlx::Error> {
    let ratings: Vec<(i64,)> =
        sqlx::query_as("SELECT rating FROM reviews WHERE seller_id = $1").bind(seller_id).fetch_all(conn).await?;
    Ok(ratings.into_iter().map(|r| r.0).collect())
}

/// Returns a product's reviews, newest first.
pub async fn fetch_reviews_for_product(
    product_id: i64,
    pagination: &Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Review>, sqlx::Error> {
    let limit = pagination.limit.unwrap_or(i64::MAX);
    let offset = pagination.offset.unwrap_or(0);
    let reviews = sqlx::query_as(
        "SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
    )
    .bind(product_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await?;
    Ok(reviews)
}
