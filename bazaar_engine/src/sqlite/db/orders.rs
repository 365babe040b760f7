use bms_common::Money;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Order, OrderItem},
    order_objects::OrderQueryFilter,
    traits::ModifyOrderRequest,
};

/// Inserts a new order row using the given connection. This is not atomic on its own. Embed this
/// call inside a transaction together with the item inserts and stock decrements, and pass
/// `&mut *tx` as the connection argument.
pub async fn insert_order(
    buyer_id: i64,
    seller_id: i64,
    notes: Option<&str>,
    total_amount: Money,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (buyer_id, seller_id, total_amount, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(buyer_id)
    .bind(seller_id)
    .bind(total_amount.value())
    .bind(notes)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn insert_order_item(
    order_id: i64,
    product_id: i64,
    quantity: i64,
    price: Money,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price.value())
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns the order's items in submission order.
pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `created_at` in ascending order.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(user_id) = query.participant_id {
        where_clause.push("(buyer_id = ");
        where_clause.push_bind_unseparated(user_id);
        where_clause.push_unseparated(" OR seller_id = ");
        where_clause.push_bind_unseparated(user_id);
        where_clause.push_unseparated(")");
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    builder.push(" ORDER BY created_at ASC, id ASC");
    if let Some(limit) = query.pagination.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    if let Some(offset) = query.pagination.offset {
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }
    trace!("📦️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📦️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}

/// Applies the update to an order. When the request completes the order, `completed_at` is stamped
/// in the same statement. Returns `None` if the order does not exist.
pub async fn update_order(
    id: i64,
    update: ModifyOrderRequest,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    if update.is_empty() {
        debug!("📦️ No fields to update for order {id}. Returning it unchanged.");
        return fetch_order(id, conn).await;
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(status) = update.new_status {
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(completed_at) = update.completion_time() {
        set_clause.push("completed_at = ");
        set_clause.push_bind_unseparated(completed_at);
    }
    if let Some(notes) = update.new_notes {
        set_clause.push("notes = ");
        set_clause.push_bind_unseparated(notes);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("📦️ Executing query: {}", builder.sql());
    let order = builder.build_query_as::<Order>().fetch_optional(conn).await?;
    Ok(order)
}
