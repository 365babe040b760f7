use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bazaar_engine::{
    db_types::{Chat, Message, Order, OrderStatus, Principal, Role},
    ChatApi,
    IdentityApi,
};
use bms_common::Money;
use chrono::{TimeZone, Utc};
use serde_json::json;

use super::{
    helpers::{buyer, get_request, identity_backend, post_request, seller, BUYER_TOKEN},
    mocks::MockBackend,
};
use crate::{
    fanout::ConnectionRegistry,
    middleware::IdentityMiddlewareFactory,
    routes::{ChatByIdRoute, MarkMessageReadRoute, MyChatsRoute, PostMessageRoute},
};

#[actix_web::test]
async fn fetch_chat_with_history() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(BUYER_TOKEN, "/api/chats/5", configure_chat_read).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, CHAT_DETAIL_JSON);
}

#[actix_web::test]
async fn strangers_may_not_read_a_chat() {
    let _ = env_logger::try_init().ok();
    let err = get_request("stranger-token", "/api/chats/5", configure_chat_read_as_stranger)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. Only participants of the order may view this chat");
}

#[actix_web::test]
async fn post_message_persists_and_returns_the_message() {
    let _ = env_logger::try_init().ok();
    let body = json!({"chat_id": 5, "content": "is the key ready?"});
    let (status, body) =
        post_request(BUYER_TOKEN, "/api/chats/messages", body, configure_post_message).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, MESSAGE_JSON);
}

#[actix_web::test]
async fn empty_messages_are_rejected() {
    let _ = env_logger::try_init().ok();
    let body = json!({"chat_id": 5, "content": "   "});
    let err =
        post_request(BUYER_TOKEN, "/api/chats/messages", body, configure_empty_message).await.expect_err("Expected error");
    assert_eq!(err, "Invalid request. Message content cannot be empty");
}

#[actix_web::test]
async fn senders_may_not_acknowledge_their_own_messages() {
    let _ = env_logger::try_init().ok();
    let err = post_request(BUYER_TOKEN, "/api/chats/messages/7/read", json!({}), configure_own_read)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. A sender cannot mark their own message as read");
}

#[actix_web::test]
async fn other_participants_may_acknowledge_a_message() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("seller-token", "/api/chats/messages/7/read", json!({}), configure_seller_read)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, READ_MESSAGE_JSON);
}

fn configure_chat_read(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_chat().returning(|_| Ok(Some(chat_response())));
    backend.expect_fetch_order().returning(|_| Ok(Some(order_response())));
    backend.expect_fetch_messages().returning(|_| Ok(vec![message_response()]));
    configure_chats(cfg, backend, identity_backend(buyer()));
}

fn configure_chat_read_as_stranger(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_chat().returning(|_| Ok(Some(chat_response())));
    backend.expect_fetch_order().returning(|_| Ok(Some(order_response())));
    let stranger = Principal { id: 99, username: "mallory".into(), role: Role::User, active: true };
    configure_chats(cfg, backend, identity_backend(stranger));
}

fn configure_post_message(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_chat().returning(|_| Ok(Some(chat_response())));
    backend.expect_fetch_order().returning(|_| Ok(Some(order_response())));
    backend
        .expect_insert_message()
        .withf(|message| message.sender_id == 10 && message.content == "is the key ready?")
        .returning(|_| Ok(message_response()));
    configure_chats(cfg, backend, identity_backend(buyer()));
}

fn configure_empty_message(cfg: &mut ServiceConfig) {
    // Content is rejected before the backend is consulted
    configure_chats(cfg, MockBackend::new(), identity_backend(buyer()));
}

fn configure_own_read(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_message().returning(|_| Ok(Some(message_response())));
    configure_chats(cfg, backend, identity_backend(buyer()));
}

fn configure_seller_read(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_message().returning(|_| Ok(Some(message_response())));
    backend.expect_fetch_chat().returning(|_| Ok(Some(chat_response())));
    backend.expect_fetch_order().returning(|_| Ok(Some(order_response())));
    backend.expect_mark_message_read().returning(|_| Ok(read_message_response()));
    configure_chats(cfg, backend, identity_backend(seller()));
}

fn configure_chats(cfg: &mut ServiceConfig, backend: MockBackend, identity: MockBackend) {
    let chat_api = ChatApi::new(backend);
    let identity_api = IdentityApi::new(identity);
    cfg.app_data(web::Data::new(chat_api))
        .app_data(web::Data::new(identity_api))
        .app_data(web::Data::new(ConnectionRegistry::default()))
        .service(
            web::scope("/api")
                .wrap(IdentityMiddlewareFactory::<MockBackend>::new())
                .service(MyChatsRoute::<MockBackend>::new())
                .service(PostMessageRoute::<MockBackend>::new())
                .service(MarkMessageReadRoute::<MockBackend>::new())
                .service(ChatByIdRoute::<MockBackend>::new()),
        );
}

fn order_response() -> Order {
    Order {
        id: 1,
        buyer_id: 10,
        seller_id: 20,
        status: OrderStatus::Processing,
        total_amount: Money::from_cents(2000),
        notes: None,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        completed_at: None,
    }
}

fn chat_response() -> Chat {
    Chat {
        id: 5,
        order_id: 1,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 1).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 1).unwrap(),
    }
}

fn message_response() -> Message {
    Message {
        id: 7,
        chat_id: 5,
        sender_id: 10,
        content: "is the key ready?".to_string(),
        is_read: false,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    }
}

fn read_message_response() -> Message {
    Message { is_read: true, updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap(), ..message_response() }
}

const CHAT_DETAIL_JSON: &str = r#"{"id":5,"order_id":1,"created_at":"2024-02-29T13:30:01Z","updated_at":"2024-02-29T13:30:01Z","messages":[{"id":7,"chat_id":5,"sender_id":10,"content":"is the key ready?","is_read":false,"created_at":"2024-03-01T09:00:00Z","updated_at":"2024-03-01T09:00:00Z"}]}"#;

const MESSAGE_JSON: &str = r#"{"id":7,"chat_id":5,"sender_id":10,"content":"is the key ready?","is_read":false,"created_at":"2024-03-01T09:00:00Z","updated_at":"2024-03-01T09:00:00Z"}"#;

const READ_MESSAGE_JSON: &str = r#"{"id":7,"chat_id":5,"sender_id":10,"content":"is the key ready?","is_read":true,"created_at":"2024-03-01T09:00:00Z","updated_at":"2024-03-01T09:05:00Z"}"#;
