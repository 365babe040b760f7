use sqlx::SqliteConnection;

use crate::db_types::Principal;

/// Resolves an opaque access credential to the principal it belongs to.
pub async fn fetch_principal_by_credential(
    credential: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Principal>, sqlx::Error> {
    let principal = sqlx::query_as("SELECT id, username, role, is_active FROM users WHERE access_token = $1")
        .bind(credential)
        .fetch_optional(conn)
        .await?;
    Ok(principal)
}

pub async fn fetch_principal(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Principal>, sqlx::Error> {
    let principal = sqlx::query_as("SELECT id, username, role, is_active FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(principal)
}

/// Overwrites the seller's aggregate rating. The caller is responsible for computing the mean.
pub async fn update_seller_rating(
    seller_id: i64,
    rating: f64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET rating = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(rating)
        .bind(seller_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_seller_rating(seller_id: i64, conn: &mut SqliteConnection) -> Result<Option<f64>, sqlx::Error> {
    let rating: Option<(Option<f64>,)> =
        sqlx::query_as("SELECT rating FROM users WHERE id = $1").bind(seller_id).fetch_optional(conn).await?;
    Ok(rating.and_then(|r| r.0))
}
