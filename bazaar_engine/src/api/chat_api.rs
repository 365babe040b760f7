use std::fmt::Debug;

use log::*;

use crate::{
    api::errors::ChatApiError,
    authz::capability_for,
    chat_objects::{ChatDetail, ChatQueryFilter},
    db_types::{Chat, Message, NewMessage, Order, Principal},
    order_objects::Pagination,
    traits::{ChatManagement, ChatManagementError, OrderManagement},
};

/// `ChatApi` manages the messaging channel bound 1:1 to each order: reads with the same visibility
/// rule as orders, message posting, and read receipts.
pub struct ChatApi<B> {
    db: B,
}

impl<B> Debug for ChatApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChatApi")
    }
}

impl<B> ChatApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ChatApi<B>
where B: ChatManagement + OrderManagement
{
    /// Role-scoped chat listing: admins see every chat, everyone else only the chats of orders
    /// they are a party to.
    pub async fn fetch_chats(&self, actor: &Principal, pagination: Pagination) -> Result<Vec<Chat>, ChatApiError> {
        let query = if actor.is_admin() {
            ChatQueryFilter::default().with_pagination(pagination)
        } else {
            ChatQueryFilter::for_participant(actor.id).with_pagination(pagination)
        };
        let chats = self.db.fetch_chats(query).await?;
        Ok(chats)
    }

    /// Fetch a chat together with its message history. Only participants of the parent order and
    /// admins may read it.
    pub async fn fetch_chat(&self, actor: &Principal, chat_id: i64) -> Result<ChatDetail, ChatApiError> {
        let chat = self.db.fetch_chat(chat_id).await?.ok_or(ChatApiError::ChatNotFound(chat_id))?;
        self.check_participant(actor, &chat, "view this chat").await?;
        let messages = self.db.fetch_messages(chat_id).await?;
        Ok(ChatDetail { chat, messages })
    }

    /// The parent order of a chat, for callers that need to authorize against it themselves.
    pub async fn order_for_chat(&self, chat_id: i64) -> Result<Option<(Chat, Order)>, ChatApiError> {
        let chat = match self.db.fetch_chat(chat_id).await? {
            Some(chat) => chat,
            None => return Ok(None),
        };
        let order = self.parent_order(&chat).await?;
        Ok(Some((chat, order)))
    }

    /// Persist a message in the chat on behalf of `sender`.
    ///
    /// Content is trimmed and must be non-empty; the sender must be a participant of the parent
    /// order or an admin. The persisted message is returned for downstream delivery.
    pub async fn post_message(&self, sender: &Principal, chat_id: i64, content: &str) -> Result<Message, ChatApiError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatApiError::EmptyMessage);
        }
        let chat = self.db.fetch_chat(chat_id).await?.ok_or(ChatApiError::ChatNotFound(chat_id))?;
        self.check_participant(sender, &chat, "post to this chat").await?;
        let message = self.db.insert_message(NewMessage::new(chat_id, sender.id, content)).await?;
        debug!("💬️ Message {} posted to chat {chat_id} by {}", message.id, sender.username);
        Ok(message)
    }

    /// Mark a message as read on behalf of `actor`. Senders cannot acknowledge their own messages;
    /// any other participant of the parent order (or an admin) can, and the call is idempotent.
    pub async fn mark_read(&self, actor: &Principal, message_id: i64) -> Result<Message, ChatApiError> {
        let message = self.db.fetch_message(message_id).await?.ok_or(ChatApiError::MessageNotFound(message_id))?;
        if message.sender_id == actor.id {
            return Err(ChatApiError::OwnMessage);
        }
        let chat = self
            .db
            .fetch_chat(message.chat_id)
            .await?
            .ok_or(ChatApiError::ChatNotFound(message.chat_id))?;
        self.check_participant(actor, &chat, "read this message").await?;
        let message = self.db.mark_message_read(message_id).await?;
        trace!("💬️ Message {message_id} marked as read by {}", actor.username);
        Ok(message)
    }

    async fn parent_order(&self, chat: &Chat) -> Result<Order, ChatApiError> {
        self.db
            .fetch_order(chat.order_id)
            .await?
            .ok_or_else(|| ChatManagementError::OrderNotFound(chat.order_id).into())
    }

    async fn check_participant(&self, actor: &Principal, chat: &Chat, action: &str) -> Result<(), ChatApiError> {
        let order = self.parent_order(chat).await?;
        if capability_for(actor, &order).may_view() {
            Ok(())
        } else {
            Err(ChatApiError::NotPermitted(format!("Only participants of the order may {action}")))
        }
    }
}
