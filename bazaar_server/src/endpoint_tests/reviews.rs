use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bazaar_engine::{
    db_types::{Order, OrderItem, OrderStatus, Review},
    IdentityApi,
    ReviewApi,
};
use bms_common::Money;
use chrono::{TimeZone, Utc};
use serde_json::json;

use super::{
    helpers::{buyer, get_request, identity_backend, post_request, BUYER_TOKEN},
    mocks::MockBackend,
};
use crate::{
    middleware::IdentityMiddlewareFactory,
    routes::{CreateReviewRoute, ProductReviewsRoute},
};

#[actix_web::test]
async fn review_a_completed_order() {
    let _ = env_logger::try_init().ok();
    let body = json!({"product_id": 100, "seller_id": 20, "rating": 5, "comment": "instant delivery"});
    let (status, body) =
        post_request(BUYER_TOKEN, "/api/orders/1/reviews", body, configure_review).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, REVIEW_JSON);
}

#[actix_web::test]
async fn duplicate_reviews_are_rejected() {
    let _ = env_logger::try_init().ok();
    let body = json!({"product_id": 100, "seller_id": 20, "rating": 4});
    let err = post_request(BUYER_TOKEN, "/api/orders/1/reviews", body, configure_duplicate_review)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Conflict. A review for this product and seller already exists");
}

#[actix_web::test]
async fn reviews_require_a_completed_order() {
    let _ = env_logger::try_init().ok();
    let body = json!({"product_id": 100, "seller_id": 20, "rating": 5});
    let err = post_request(BUYER_TOKEN, "/api/orders/1/reviews", body, configure_pending_order)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Invalid request. Reviews can only be left on completed orders");
}

#[actix_web::test]
async fn out_of_range_ratings_are_rejected() {
    let _ = env_logger::try_init().ok();
    let body = json!({"product_id": 100, "seller_id": 20, "rating": 6});
    let err =
        post_request(BUYER_TOKEN, "/api/orders/1/reviews", body, configure_review).await.expect_err("Expected error");
    assert_eq!(err, "Invalid request. Rating must be an integer between 1 and 5, got 6");
}

#[actix_web::test]
async fn product_reviews_are_public() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/orders/reviews/100", configure_public_reviews).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, REVIEW_LIST_JSON);
}

fn configure_review(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order().returning(|_| Ok(Some(completed_order())));
    backend.expect_review_exists().returning(|_, _, _| Ok(false));
    backend.expect_fetch_order_items().returning(|_| Ok(items_response()));
    backend.expect_insert_review().returning(|_| Ok(review_response()));
    configure_reviews(cfg, backend, identity_backend(buyer()));
}

fn configure_duplicate_review(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order().returning(|_| Ok(Some(completed_order())));
    backend.expect_review_exists().returning(|_, _, _| Ok(true));
    configure_reviews(cfg, backend, identity_backend(buyer()));
}

fn configure_pending_order(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order().returning(|_| Ok(Some(Order { status: OrderStatus::Pending, ..completed_order() })));
    configure_reviews(cfg, backend, identity_backend(buyer()));
}

fn configure_public_reviews(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_reviews_for_product().returning(|_, _| Ok(vec![review_response()]));
    let review_api = ReviewApi::new(backend);
    // No identity API: the listing must work without any credential plumbing at all
    cfg.app_data(web::Data::new(review_api)).service(ProductReviewsRoute::<MockBackend>::new());
}

fn configure_reviews(cfg: &mut ServiceConfig, backend: MockBackend, identity: MockBackend) {
    let review_api = ReviewApi::new(backend);
    let identity_api = IdentityApi::new(identity);
    cfg.app_data(web::Data::new(review_api)).app_data(web::Data::new(identity_api)).service(
        web::scope("/api")
            .wrap(IdentityMiddlewareFactory::<MockBackend>::new())
            .service(CreateReviewRoute::<MockBackend>::new()),
    );
}

fn completed_order() -> Order {
    Order {
        id: 1,
        buyer_id: 10,
        seller_id: 20,
        status: OrderStatus::Completed,
        total_amount: Money::from_cents(2000),
        notes: None,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
        completed_at: Some(Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap()),
    }
}

fn items_response() -> Vec<OrderItem> {
    vec![OrderItem { id: 1, order_id: 1, product_id: 100, quantity: 2, price: Money::from_cents(1000) }]
}

fn review_response() -> Review {
    Review {
        id: 3,
        reviewer_id: 10,
        seller_id: 20,
        product_id: 100,
        rating: 5,
        comment: Some("instant delivery".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 3, 2, 11, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 2, 11, 0, 0).unwrap(),
    }
}

const REVIEW_JSON: &str = r#"{"id":3,"reviewer_id":10,"seller_id":20,"product_id":100,"rating":5,"comment":"instant delivery","created_at":"2024-03-02T11:00:00Z","updated_at":"2024-03-02T11:00:00Z"}"#;

const REVIEW_LIST_JSON: &str = r#"[{"id":3,"reviewer_id":10,"seller_id":20,"product_id":100,"rating":5,"comment":"instant delivery","created_at":"2024-03-02T11:00:00Z","updated_at":"2024-03-02T11:00:00Z"}]"#;
