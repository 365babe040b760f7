use bazaar_engine::{
    db_types::{Money, NewOrder, NewOrderItem, OrderStatus, Principal, Role},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::{product_quantity, seed_product, seed_user},
    },
    traits::{ModifyOrderRequest, OrderManagementError},
    OrderFlowApi,
    OrderFlowError,
    SqliteDatabase,
};

fn principal(id: i64, username: &str, role: Role) -> Principal {
    Principal { id, username: username.into(), role, active: true }
}

async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

fn line(product_id: i64, quantity: i64) -> NewOrderItem {
    NewOrderItem { product_id, quantity }
}

#[tokio::test]
async fn placing_an_order_snapshots_prices_and_creates_the_chat() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let api = OrderFlowApi::new(db.clone());
    let buyer = principal(buyer_id, "alice", Role::User);

    let order = NewOrder::new(buyer_id, seller_id, vec![line(product_id, 2)]).with_notes("deliver to my inbox");
    let detail = api.place_order(&buyer, order).await.expect("Error placing order");

    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.total_amount, Money::from_cents(2000));
    assert_eq!(detail.order.notes.as_deref(), Some("deliver to my inbox"));
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].price, Money::from_cents(1000));
    assert_eq!(product_quantity(&db, product_id).await, 3);

    // The chat was created with the order, and asking again returns the same chat
    let chat = api.chat_for_order(detail.order.id).await.expect("Error fetching chat");
    let chat_again = api.chat_for_order(detail.order.id).await.expect("Error fetching chat");
    assert_eq!(chat.id, chat_again.id);
    assert_eq!(chat.order_id, detail.order.id);

    // A later catalog price change does not touch the recorded total
    sqlx::query("UPDATE products SET price = 99999 WHERE id = $1")
        .bind(product_id)
        .execute(db.pool())
        .await
        .expect("Error repricing product");
    let detail = api.fetch_order(&buyer, detail.order.id).await.expect("Error re-reading order");
    assert_eq!(detail.order.total_amount, Money::from_cents(2000));
    assert_eq!(detail.items[0].price, Money::from_cents(1000));
}

#[tokio::test]
async fn buyers_cannot_order_from_themselves() {
    let db = new_db().await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(500), 5).await;
    let api = OrderFlowApi::new(db);
    let bob = principal(seller_id, "bob", Role::Seller);

    let err = api
        .place_order(&bob, NewOrder::new(seller_id, seller_id, vec![line(product_id, 1)]))
        .await
        .expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::OrderManagement(OrderManagementError::SelfTrade)));
}

#[tokio::test]
async fn orders_must_contain_at_least_one_item() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let api = OrderFlowApi::new(db);
    let buyer = principal(buyer_id, "alice", Role::User);

    let err =
        api.place_order(&buyer, NewOrder::new(buyer_id, seller_id, vec![])).await.expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::OrderManagement(OrderManagementError::EmptyOrder)));
}

#[tokio::test]
async fn the_selling_party_must_hold_a_seller_role() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let not_a_seller = seed_user(&db, "carol", Role::User, "tok-carol").await;
    let api = OrderFlowApi::new(db);
    let buyer = principal(buyer_id, "alice", Role::User);

    let err = api
        .place_order(&buyer, NewOrder::new(buyer_id, not_a_seller, vec![line(1, 1)]))
        .await
        .expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::OrderManagement(OrderManagementError::NotASeller(_))));
}

#[tokio::test]
async fn a_failing_line_rolls_back_every_decrement() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let plentiful = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let scarce = seed_product(&db, seller_id, Money::from_cents(2500), 1).await;
    let api = OrderFlowApi::new(db.clone());
    let buyer = principal(buyer_id, "alice", Role::User);

    let order = NewOrder::new(buyer_id, seller_id, vec![line(plentiful, 2), line(scarce, 3)]);
    let err = api.place_order(&buyer, order).await.expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::OrderManagement(OrderManagementError::InsufficientStock(id)) if id == scarce));

    // The first line's decrement must not survive the failed order
    assert_eq!(product_quantity(&db, plentiful).await, 5);
    assert_eq!(product_quantity(&db, scarce).await, 1);
}

#[tokio::test]
async fn products_must_belong_to_the_requested_seller() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let other_seller = seed_user(&db, "dave", Role::Seller, "tok-dave").await;
    let foreign_product = seed_product(&db, other_seller, Money::from_cents(1000), 5).await;
    let api = OrderFlowApi::new(db);
    let buyer = principal(buyer_id, "alice", Role::User);

    let err = api
        .place_order(&buyer, NewOrder::new(buyer_id, seller_id, vec![line(foreign_product, 1)]))
        .await
        .expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::OrderManagement(OrderManagementError::ProductSellerMismatch(_))));
}

#[tokio::test]
async fn status_transitions_follow_the_permission_table() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let admin_id = seed_user(&db, "root", Role::Admin, "tok-root").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let api = OrderFlowApi::new(db);
    let buyer = principal(buyer_id, "alice", Role::User);
    let seller = principal(seller_id, "bob", Role::Seller);
    let admin = principal(admin_id, "root", Role::Admin);
    let stranger = principal(9999, "mallory", Role::User);

    let detail = api
        .place_order(&buyer, NewOrder::new(buyer_id, seller_id, vec![line(product_id, 1)]))
        .await
        .expect("Error placing order");
    let order_id = detail.order.id;
    let to = |status: OrderStatus| ModifyOrderRequest::default().with_status(status);

    // Strangers cannot touch the order at all
    let err = api.update_order(&stranger, order_id, to(OrderStatus::Cancelled)).await.expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::NotPermitted(_)));

    // Only the seller (or admin) moves an order into processing
    let err = api.update_order(&buyer, order_id, to(OrderStatus::Processing)).await.expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::NotPermitted(_)));
    let order = api.update_order(&seller, order_id, to(OrderStatus::Processing)).await.expect("Error updating order");
    assert_eq!(order.status, OrderStatus::Processing);

    // Only the buyer (or admin) completes, and completion is stamped
    let err = api.update_order(&seller, order_id, to(OrderStatus::Completed)).await.expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::NotPermitted(_)));
    let order = api.update_order(&buyer, order_id, to(OrderStatus::Completed)).await.expect("Error updating order");
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.completed_at.is_some());

    // Refunds are admin-only
    let err = api.update_order(&seller, order_id, to(OrderStatus::Refunded)).await.expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::NotPermitted(_)));
    let err = api.update_order(&buyer, order_id, to(OrderStatus::Refunded)).await.expect_err("Expected rejection");
    assert!(matches!(err, OrderFlowError::NotPermitted(_)));
    let order = api.update_order(&admin, order_id, to(OrderStatus::Refunded)).await.expect("Error updating order");
    assert_eq!(order.status, OrderStatus::Refunded);
}

#[tokio::test]
async fn order_listings_are_scoped_by_role() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let outsider_id = seed_user(&db, "carol", Role::User, "tok-carol").await;
    let admin_id = seed_user(&db, "root", Role::Admin, "tok-root").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let api = OrderFlowApi::new(db);
    let buyer = principal(buyer_id, "alice", Role::User);

    api.place_order(&buyer, NewOrder::new(buyer_id, seller_id, vec![line(product_id, 1)]))
        .await
        .expect("Error placing order");

    let mine = api.fetch_orders(&buyer, Default::default()).await.expect("Error listing orders");
    assert_eq!(mine.len(), 1);
    let sellers = api
        .fetch_orders(&principal(seller_id, "bob", Role::Seller), Default::default())
        .await
        .expect("Error listing orders");
    assert_eq!(sellers.len(), 1);
    let outsiders = api
        .fetch_orders(&principal(outsider_id, "carol", Role::User), Default::default())
        .await
        .expect("Error listing orders");
    assert!(outsiders.is_empty());
    let admins = api
        .fetch_orders(&principal(admin_id, "root", Role::Admin), Default::default())
        .await
        .expect("Error listing orders");
    assert_eq!(admins.len(), 1);
}
