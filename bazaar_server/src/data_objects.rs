use std::fmt::Display;

use bazaar_engine::db_types::{Message, NewOrderItem, Principal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderParams {
    pub seller_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<OrderItemParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemParams {
    pub product_id: i64,
    pub quantity: i64,
}

impl From<OrderItemParams> for NewOrderItem {
    fn from(params: OrderItemParams) -> Self {
        NewOrderItem { product_id: params.product_id, quantity: params.quantity }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderParams {
    /// The target status, as its lowercase wire name. Unknown values are rejected.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessageParams {
    pub chat_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReviewParams {
    pub product_id: i64,
    pub seller_id: i64,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Query parameters accepted by the realtime channel endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamQuery {
    pub credential: String,
}

//--------------------------------------    Chat events     ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInfo {
    pub id: i64,
    pub username: String,
}

/// An outbound realtime frame. `message` events carry a persisted chat message; `presence` events
/// announce a participant joining or leaving the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    Message {
        id: i64,
        chat_id: i64,
        sender_id: i64,
        content: String,
        is_read: bool,
        created_at: DateTime<Utc>,
        sender: SenderInfo,
    },
    Presence {
        user_id: i64,
        username: String,
        connected: bool,
        timestamp: DateTime<Utc>,
    },
}

impl ChatEvent {
    pub fn from_message(message: &Message, sender: &Principal) -> Self {
        ChatEvent::Message {
            id: message.id,
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            is_read: message.is_read,
            created_at: message.created_at,
            sender: SenderInfo { id: sender.id, username: sender.username.clone() },
        }
    }

    pub fn presence(principal: &Principal, connected: bool) -> Self {
        ChatEvent::Presence {
            user_id: principal.id,
            username: principal.username.clone(),
            connected,
            timestamp: Utc::now(),
        }
    }
}

/// An inbound websocket frame: one message submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundFrame {
    pub content: String,
}

#[cfg(test)]
mod test {
    use bazaar_engine::db_types::Role;

    use super::*;

    #[test]
    fn chat_events_serialize_with_type_tag() {
        let principal = Principal { id: 7, username: "alice".into(), role: Role::User, active: true };
        let event = ChatEvent::presence(&principal, true);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"presence""#));
        assert!(json.contains(r#""connected":true"#));

        let message = Message {
            id: 1,
            chat_id: 2,
            sender_id: 7,
            content: "hello".into(),
            is_read: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&ChatEvent::from_message(&message, &principal)).unwrap();
        assert!(json.contains(r#""type":"message""#));
        assert!(json.contains(r#""content":"hello""#));
        assert!(json.contains(r#""username":"alice""#));
    }

    #[test]
    fn inbound_frames_are_single_submissions() {
        let frame: InboundFrame = serde_json::from_str(r#"{"content": "  hi there "}"#).unwrap();
        assert_eq!(frame.content, "  hi there ");
        assert!(serde_json::from_str::<InboundFrame>("not json").is_err());
    }
}
