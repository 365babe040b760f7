use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Chat, Message},
    order_objects::Pagination,
};

//--------------------------------------   ChatQueryFilter  ---------------------------------------------------------
/// Criteria for fetching chats. An empty filter matches every chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatQueryFilter {
    /// Restrict results to chats whose parent order has this user as buyer or seller.
    pub participant_id: Option<i64>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl ChatQueryFilter {
    pub fn for_participant(user_id: i64) -> Self {
        Self { participant_id: Some(user_id), ..Default::default() }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

//--------------------------------------     ChatDetail     ---------------------------------------------------------
/// A chat together with its message history, in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDetail {
    #[serde(flatten)]
    pub chat: Chat,
    pub messages: Vec<Message>,
}
