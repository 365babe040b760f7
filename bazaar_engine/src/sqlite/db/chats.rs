use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{chat_objects::ChatQueryFilter, db_types::Chat};

pub async fn insert_chat(order_id: i64, conn: &mut SqliteConnection) -> Result<Chat, sqlx::Error> {
    let chat = sqlx::query_as("INSERT INTO chats (order_id) VALUES ($1) RETURNING *")
        .bind(order_id)
        .fetch_one(conn)
        .await?;
    Ok(chat)
}

pub async fn fetch_chat(id: i64, conn: &mut SqliteConnection) -> Result<Option<Chat>, sqlx::Error> {
    let chat = sqlx::query_as("SELECT * FROM chats WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(chat)
}

pub async fn fetch_chat_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Chat>, sqlx::Error> {
    let chat = sqlx::query_as("SELECT * FROM chats WHERE order_id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(chat)
}

/// Fetches chats according to criteria specified in the `ChatQueryFilter`.
///
/// Resulting chats are ordered by `created_at` in ascending order.
pub async fn search_chats(query: ChatQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Chat>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT chats.* FROM chats ");
    if let Some(user_id) = query.participant_id {
        builder.push("JOIN orders ON chats.order_id = orders.id WHERE (orders.buyer_id = ");
        builder.push_bind(user_id);
        builder.push(" OR orders.seller_id = ");
        builder.push_bind(user_id);
        builder.push(")");
    }
    builder.push(" ORDER BY chats.created_at ASC, chats.id ASC");
    if let Some(limit) = query.pagination.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    if let Some(offset) = query.pagination.offset {
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }
    trace!("💬️ Executing query: {}", builder.sql());
    let chats = builder.build_query_as::<Chat>().fetch_all(conn).await?;
    Ok(chats)
}
