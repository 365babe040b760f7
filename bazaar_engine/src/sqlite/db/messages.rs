use sqlx::SqliteConnection;

use crate::db_types::{Message, NewMessage};

pub async fn insert_message(message: NewMessage, conn: &mut SqliteConnection) -> Result<Message, sqlx::Error> {
    let message = sqlx::query_as(
        r#"
            INSERT INTO messages (chat_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(message.chat_id)
    .bind(message.sender_id)
    .bind(message.content)
    .fetch_one(conn)
    .await?;
    Ok(message)
}

pub async fn fetch_message(id: i64, conn: &mut SqliteConnection) -> Result<Option<Message>, sqlx::Error> {
    let message = sqlx::query_as("SELECT * FROM messages WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(message)
}

/// Returns the chat's messages in chronological order.
pub async fn fetch_messages(chat_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Message>, sqlx::Error> {
    let messages = sqlx::query_as("SELECT * FROM messages WHERE chat_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(chat_id)
        .fetch_all(conn)
        .await?;
    Ok(messages)
}

/// Sets the read flag and bumps the updated timestamp. Marking an already-read message again leaves
/// it read. Returns `None` if the message does not exist.
pub async fn mark_read(id: i64, conn: &mut SqliteConnection) -> Result<Option<Message>, sqlx::Error> {
    let message =
        sqlx::query_as("UPDATE messages SET is_read = 1, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(message)
}
