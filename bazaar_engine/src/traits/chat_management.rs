use thiserror::Error;

use crate::{
    chat_objects::ChatQueryFilter,
    db_types::{Chat, Message, NewMessage},
};

/// Channel registry behaviour that a backend must expose: the 1:1 chat bound to each order, and the
/// messages flowing through it.
#[allow(async_fn_in_trait)]
pub trait ChatManagement: Clone {
    /// Returns the chat for the given order, creating it if it does not exist yet.
    ///
    /// Safe to call concurrently for the same order: the unique constraint on `order_id` is the
    /// correctness backstop, and a uniqueness conflict is resolved by re-reading the winner rather
    /// than surfacing an error.
    async fn create_chat_for_order(&self, order_id: i64) -> Result<Chat, ChatManagementError>;

    async fn fetch_chat(&self, id: i64) -> Result<Option<Chat>, ChatManagementError>;

    async fn fetch_chat_for_order(&self, order_id: i64) -> Result<Option<Chat>, ChatManagementError>;

    /// Fetches chats according to the criteria in the filter, ordered by creation time.
    async fn fetch_chats(&self, query: ChatQueryFilter) -> Result<Vec<Chat>, ChatManagementError>;

    /// Messages are returned in chronological order.
    async fn fetch_messages(&self, chat_id: i64) -> Result<Vec<Message>, ChatManagementError>;

    async fn fetch_message(&self, id: i64) -> Result<Option<Message>, ChatManagementError>;

    /// Persists a message with `is_read = false`. Content validation happens upstream.
    async fn insert_message(&self, message: NewMessage) -> Result<Message, ChatManagementError>;

    /// Sets `is_read = true` and bumps the updated timestamp. Idempotent.
    async fn mark_message_read(&self, id: i64) -> Result<Message, ChatManagementError>;
}

#[derive(Debug, Clone, Error)]
pub enum ChatManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Chat {0} does not exist")]
    ChatNotFound(i64),
    #[error("Message {0} does not exist")]
    MessageNotFound(i64),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
}

impl From<sqlx::Error> for ChatManagementError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
