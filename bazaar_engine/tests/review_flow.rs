use bazaar_engine::{
    db_types::{Money, NewOrder, NewOrderItem, OrderStatus, Principal, Role},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::{product_quantity, seed_product, seed_user},
    },
    traits::{ModifyOrderRequest, ReviewManagementError},
    OrderFlowApi,
    ReviewApi,
    ReviewApiError,
    ReviewRequest,
    SqliteDatabase,
};

fn principal(id: i64, username: &str, role: Role) -> Principal {
    Principal { id, username: username.into(), role, active: true }
}

fn request(product_id: i64, seller_id: i64, rating: i64) -> ReviewRequest {
    ReviewRequest { product_id, seller_id, rating, comment: None }
}

async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

/// Walk an order from placement to completion and return its id.
async fn completed_order(
    orders: &OrderFlowApi<SqliteDatabase>,
    buyer: &Principal,
    seller: &Principal,
    items: Vec<NewOrderItem>,
) -> i64 {
    let detail = orders
        .place_order(buyer, NewOrder::new(buyer.id, seller.id, items))
        .await
        .expect("Error placing order");
    let order_id = detail.order.id;
    orders
        .update_order(seller, order_id, ModifyOrderRequest::default().with_status(OrderStatus::Processing))
        .await
        .expect("Error accepting order");
    orders
        .update_order(buyer, order_id, ModifyOrderRequest::default().with_status(OrderStatus::Completed))
        .await
        .expect("Error completing order");
    order_id
}

#[tokio::test]
async fn the_full_transaction_loop() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let orders = OrderFlowApi::new(db.clone());
    let reviews = ReviewApi::new(db.clone());
    let buyer = principal(buyer_id, "alice", Role::User);
    let seller = principal(seller_id, "bob", Role::Seller);

    // Place: total is 20.00, stock drops to 3, and the chat is bound to the order
    let detail = orders
        .place_order(&buyer, NewOrder::new(buyer_id, seller_id, vec![NewOrderItem { product_id, quantity: 2 }]))
        .await
        .expect("Error placing order");
    let order_id = detail.order.id;
    assert_eq!(detail.order.total_amount, Money::from_cents(2000));
    assert_eq!(product_quantity(&db, product_id).await, 3);
    let chat = orders.chat_for_order(order_id).await.expect("Error fetching chat");
    assert_eq!(chat.order_id, order_id);

    // Drive the lifecycle: seller accepts, buyer completes
    let order = orders
        .update_order(&seller, order_id, ModifyOrderRequest::default().with_status(OrderStatus::Processing))
        .await
        .expect("Error accepting order");
    assert_eq!(order.status, OrderStatus::Processing);
    let order = orders
        .update_order(&buyer, order_id, ModifyOrderRequest::default().with_status(OrderStatus::Completed))
        .await
        .expect("Error completing order");
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.completed_at.is_some());

    // Review closes the loop and sets the seller's aggregate
    let review =
        reviews.submit_review(&buyer, order_id, request(product_id, seller_id, 5)).await.expect("Error reviewing");
    assert_eq!(review.rating, 5);
    assert_eq!(reviews.seller_rating(seller_id).await.expect("Error fetching rating"), Some(5.0));

    // The same (reviewer, product, seller) triple cannot be reviewed twice
    let err =
        reviews.submit_review(&buyer, order_id, request(product_id, seller_id, 4)).await.expect_err("Expected rejection");
    assert!(matches!(err, ReviewApiError::ReviewManagement(ReviewManagementError::DuplicateReview)));
    assert_eq!(reviews.seller_rating(seller_id).await.expect("Error fetching rating"), Some(5.0));
}

#[tokio::test]
async fn reviews_require_a_completed_order() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let orders = OrderFlowApi::new(db.clone());
    let reviews = ReviewApi::new(db.clone());
    let buyer = principal(buyer_id, "alice", Role::User);

    let detail = orders
        .place_order(&buyer, NewOrder::new(buyer_id, seller_id, vec![NewOrderItem { product_id, quantity: 1 }]))
        .await
        .expect("Error placing order");
    let err = reviews
        .submit_review(&buyer, detail.order.id, request(product_id, seller_id, 5))
        .await
        .expect_err("Expected rejection");
    assert!(matches!(err, ReviewApiError::OrderNotCompleted));
}

#[tokio::test]
async fn ratings_must_lie_between_one_and_five() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let orders = OrderFlowApi::new(db.clone());
    let reviews = ReviewApi::new(db.clone());
    let buyer = principal(buyer_id, "alice", Role::User);
    let seller = principal(seller_id, "bob", Role::Seller);
    let order_id =
        completed_order(&orders, &buyer, &seller, vec![NewOrderItem { product_id, quantity: 1 }]).await;

    for rating in [0, 6, -3] {
        let err = reviews
            .submit_review(&buyer, order_id, request(product_id, seller_id, rating))
            .await
            .expect_err("Expected rejection");
        assert!(matches!(err, ReviewApiError::InvalidRating(r) if r == rating));
    }
}

#[tokio::test]
async fn the_product_and_seller_must_match_the_order() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let other_seller_id = seed_user(&db, "dave", Role::Seller, "tok-dave").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let unrelated_product = seed_product(&db, seller_id, Money::from_cents(700), 5).await;
    let orders = OrderFlowApi::new(db.clone());
    let reviews = ReviewApi::new(db.clone());
    let buyer = principal(buyer_id, "alice", Role::User);
    let seller = principal(seller_id, "bob", Role::Seller);
    let order_id =
        completed_order(&orders, &buyer, &seller, vec![NewOrderItem { product_id, quantity: 1 }]).await;

    let err = reviews
        .submit_review(&buyer, order_id, request(unrelated_product, seller_id, 5))
        .await
        .expect_err("Expected rejection");
    assert!(matches!(err, ReviewApiError::ProductNotInOrder(p) if p == unrelated_product));

    let err = reviews
        .submit_review(&buyer, order_id, request(product_id, other_seller_id, 5))
        .await
        .expect_err("Expected rejection");
    assert!(matches!(err, ReviewApiError::SellerMismatch));
}

#[tokio::test]
async fn only_the_buyer_may_review() {
    let db = new_db().await;
    let buyer_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let product_id = seed_product(&db, seller_id, Money::from_cents(1000), 5).await;
    let orders = OrderFlowApi::new(db.clone());
    let reviews = ReviewApi::new(db.clone());
    let buyer = principal(buyer_id, "alice", Role::User);
    let seller = principal(seller_id, "bob", Role::Seller);
    let order_id =
        completed_order(&orders, &buyer, &seller, vec![NewOrderItem { product_id, quantity: 1 }]).await;

    let err = reviews
        .submit_review(&seller, order_id, request(product_id, seller_id, 5))
        .await
        .expect_err("Expected rejection");
    assert!(matches!(err, ReviewApiError::NotPermitted(_)));
}

#[tokio::test]
async fn the_aggregate_is_the_mean_over_all_reviews() {
    let db = new_db().await;
    let alice_id = seed_user(&db, "alice", Role::User, "tok-alice").await;
    let carol_id = seed_user(&db, "carol", Role::User, "tok-carol").await;
    let seller_id = seed_user(&db, "bob", Role::Seller, "tok-bob").await;
    let product_a = seed_product(&db, seller_id, Money::from_cents(1000), 10).await;
    let product_b = seed_product(&db, seller_id, Money::from_cents(2000), 10).await;
    let orders = OrderFlowApi::new(db.clone());
    let reviews = ReviewApi::new(db.clone());
    let alice = principal(alice_id, "alice", Role::User);
    let carol = principal(carol_id, "carol", Role::User);
    let seller = principal(seller_id, "bob", Role::Seller);

    let alice_order = completed_order(
        &orders,
        &alice,
        &seller,
        vec![NewOrderItem { product_id: product_a, quantity: 1 }, NewOrderItem { product_id: product_b, quantity: 1 }],
    )
    .await;
    let carol_order =
        completed_order(&orders, &carol, &seller, vec![NewOrderItem { product_id: product_a, quantity: 1 }]).await;

    reviews.submit_review(&alice, alice_order, request(product_a, seller_id, 5)).await.expect("Error reviewing");
    assert_eq!(reviews.seller_rating(seller_id).await.expect("Error fetching rating"), Some(5.0));

    reviews.submit_review(&carol, carol_order, request(product_a, seller_id, 4)).await.expect("Error reviewing");
    assert_eq!(reviews.seller_rating(seller_id).await.expect("Error fetching rating"), Some(4.5));

    // 5, 4, 5 → 4.666… stored to two decimals
    reviews.submit_review(&alice, alice_order, request(product_b, seller_id, 5)).await.expect("Error reviewing");
    assert_eq!(reviews.seller_rating(seller_id).await.expect("Error fetching rating"), Some(4.67));

    // Reviews are listed per product, newest first
    let listed = reviews.product_reviews(product_a, Default::default()).await.expect("Error listing reviews");
    assert_eq!(listed.len(), 2);
    assert!(listed[0].created_at >= listed[1].created_at);
}
