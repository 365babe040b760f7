//! Fixture helpers for the identity and catalog surfaces, which are maintained outside this crate
//! in production.

use bms_common::Money;

use crate::{db_types::Role, SqliteDatabase};

pub async fn seed_user(db: &SqliteDatabase, username: &str, role: Role, access_token: &str) -> i64 {
    sqlx::query("INSERT INTO users (username, role, is_active, access_token) VALUES ($1, $2, 1, $3)")
        .bind(username)
        .bind(role.to_string())
        .bind(access_token)
        .execute(db.pool())
        .await
        .expect("Error seeding user")
        .last_insert_rowid()
}

pub async fn seed_inactive_user(db: &SqliteDatabase, username: &str, role: Role, access_token: &str) -> i64 {
    sqlx::query("INSERT INTO users (username, role, is_active, access_token) VALUES ($1, $2, 0, $3)")
        .bind(username)
        .bind(role.to_string())
        .bind(access_token)
        .execute(db.pool())
        .await
        .expect("Error seeding user")
        .last_insert_rowid()
}

pub async fn seed_product(db: &SqliteDatabase, seller_id: i64, price: Money, quantity: i64) -> i64 {
    sqlx::query("INSERT INTO products (seller_id, price, quantity) VALUES ($1, $2, $3)")
        .bind(seller_id)
        .bind(price.value())
        .bind(quantity)
        .execute(db.pool())
        .await
        .expect("Error seeding product")
        .last_insert_rowid()
}

pub async fn product_quantity(db: &SqliteDatabase, product_id: i64) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT quantity FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(db.pool())
        .await
        .expect("Error fetching product quantity");
    row.0
}
