use bazaar_engine::{
    db_types::{Money, NewOrder, NewOrderItem, Principal, Role},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::{seed_product, seed_user},
    },
    ChatApi,
    ChatApiError,
    OrderFlowApi,
    SqliteDatabase,
};

fn principal(id: i64, username: &str, role: Role) -> Principal {
    Principal { id, username: username.into(), role, active: true }
}

struct Fixture {
    db: SqliteDatabase,
    buyer: Principal,
    seller: Principal,
    chat_id: i64,
}

/// Seed a buyer, a seller and one placed order, and return its chat.
async fn fixture() -> Fixture {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let buyer = principal(buyer_id, "alice", Role::User);
    let seller = principal(seller_id, "bob", Role::Seller);
    let orders = OrderFlowApi::new(db.clone());
    let detail = orders
        .place_order(&buyer, NewOrder::new(buyer_id, seller_id, vec![NewOrderItem { product_id, quantity: 1 }]))
        .await
        .expect("Error placing order");
    let chat = orders.chat_for_order(detail.order.id).await.expect("Error fetching chat");
    Fixture { db, buyer, seller, chat_id: chat.id }
}

#[tokio::test]
async fn participants_exchange_messages_in_order() {
    let f = fixture().await;
    let api = ChatApi::new(f.db.clone());

    let first = api.post_message(&f.buyer, f.chat_id, "is the key ready?").await.expect("Error posting message");
    assert_eq!(first.sender_id, f.buyer.id);
    assert!(!first.is_read);
    let second = api.post_message(&f.seller, f.chat_id, "generating it now").await.expect("Error posting message");
    assert_eq!(second.sender_id, f.seller.id);

    let detail = api.fetch_chat(&f.buyer, f.chat_id).await.expect("Error reading chat");
    let contents = detail.messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>();
    assert_eq!(contents, vec!["is the key ready?", "generating it now"]);
}

#[tokio::test]
async fn whitespace_only_content_is_rejected() {
    let f = fixture().await;
    let api = ChatApi::new(f.db.clone());
    let err = api.post_message(&f.buyer, f.chat_id, "   \n\t ").await.expect_err("Expected rejection");
    assert!(matches!(err, ChatApiError::EmptyMessage));
}

#[tokio::test]
async fn strangers_cannot_post_or_read() {
    let f = fixture().await;
    let api = ChatApi::new(f.db.clone());
    let stranger = principal(9999, "mallory", Role::User);

    let err = api.post_message(&stranger, f.chat_id, "let me in").await.expect_err("Expected rejection");
    assert!(matches!(err, ChatApiError::NotPermitted(_)));
    let err = api.fetch_chat(&stranger, f.chat_id).await.expect_err("Expected rejection");
    assert!(matches!(err, ChatApiError::NotPermitted(_)));
}

#[tokio::test]
async fn admins_may_join_any_conversation() {
    let f = fixture().await;
    let admin_id = seed_user(&f.db, "root", Role::Admin, "tok-root").await;
    let api = ChatApi::new(f.db.clone());
    let admin = principal(admin_id, "root", Role::Admin);

    api.post_message(&admin, f.chat_id, "support here, checking in").await.expect("Error posting message");
    let detail = api.fetch_chat(&admin, f.chat_id).await.expect("Error reading chat");
    assert_eq!(detail.messages.len(), 1);
}

#[tokio::test]
async fn posting_to_a_missing_chat_fails() {
    let f = fixture().await;
    let api = ChatApi::new(f.db.clone());
    let err = api.post_message(&f.buyer, 777, "anyone there?").await.expect_err("Expected rejection");
    assert!(matches!(err, ChatApiError::ChatNotFound(777)));
}

#[tokio::test]
async fn read_receipts_cannot_come_from_the_sender() {
    let f = fixture().await;
    let api = ChatApi::new(f.db.clone());
    let message = api.post_message(&f.buyer, f.chat_id, "ping").await.expect("Error posting message");

    let err = api.mark_read(&f.buyer, message.id).await.expect_err("Expected rejection");
    assert!(matches!(err, ChatApiError::OwnMessage));

    // The counterparty can acknowledge, and doing it twice is harmless
    let message = api.mark_read(&f.seller, message.id).await.expect("Error marking read");
    assert!(message.is_read);
    let message = api.mark_read(&f.seller, message.id).await.expect("Error marking read twice");
    assert!(message.is_read);
}

#[tokio::test]
async fn chat_listings_are_scoped_by_role() {
    let f = fixture().await;
    let outsider_id = seed_user(&f.db, "carol", Role::User, "tok-carol").await;
    let admin_id = seed_user(&f.db, "root", Role::Admin, "tok-root").await;
    let api = ChatApi::new(f.db.clone());

    let mine = api.fetch_chats(&f.buyer, Default::default()).await.expect("Error listing chats");
    assert_eq!(mine.len(), 1);
    let outsiders = api
        .fetch_chats(&principal(outsider_id, "carol", Role::User), Default::default())
        .await
        .expect("Error listing chats");
    assert!(outsiders.is_empty());
    let admins = api
        .fetch_chats(&principal(admin_id, "root", Role::Admin), Default::default())
        .await
        .expect("Error listing chats");
    assert_eq!(admins.len(), 1);
}
