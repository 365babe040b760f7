use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bazaar_engine::{
    db_types::{Chat, Order, OrderItem, OrderStatus},
    IdentityApi,
    OrderFlowApi,
};
use bms_common::Money;
use chrono::{TimeZone, Utc};
use serde_json::json;

use super::{
    helpers::{admin, buyer, get_request, identity_backend, patch_request, post_request, BUYER_TOKEN},
    mocks::MockBackend,
};
use crate::{
    middleware::IdentityMiddlewareFactory,
    routes::{MyOrdersRoute, PlaceOrderRoute, UpdateOrderRoute},
};

#[actix_web::test]
async fn fetch_my_orders_no_credential() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/api/orders", configure_list_for_buyer).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. No credential was provided with the request.");
}

#[actix_web::test]
async fn fetch_my_orders_invalid_credential() {
    let _ = env_logger::try_init().ok();
    let err = get_request("bogus", "/api/orders", configure_unknown_credential).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. The credential does not resolve to a known principal.");
}

#[actix_web::test]
async fn fetch_my_orders_is_scoped_to_the_participant() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(BUYER_TOKEN, "/api/orders", configure_list_for_buyer).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn fetch_all_orders_as_admin() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("admin-token", "/api/orders", configure_list_for_admin).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn place_order_returns_detail_with_items() {
    let _ = env_logger::try_init().ok();
    let body = json!({"seller_id": 20, "notes": "gift wrap please", "items": [{"product_id": 100, "quantity": 2}]});
    let (status, body) =
        post_request(BUYER_TOKEN, "/api/orders", body, configure_place_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_DETAIL_JSON);
}

#[actix_web::test]
async fn update_order_rejects_unknown_status() {
    let _ = env_logger::try_init().ok();
    let body = json!({"status": "paid"});
    let err =
        patch_request(BUYER_TOKEN, "/api/orders/1", body, configure_update_order).await.expect_err("Expected error");
    assert_eq!(err, "Invalid request. Invalid order status: paid");
}

#[actix_web::test]
async fn buyer_may_not_move_an_order_to_processing() {
    let _ = env_logger::try_init().ok();
    let body = json!({"status": "processing"});
    let err =
        patch_request(BUYER_TOKEN, "/api/orders/1", body, configure_update_order).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. You are not permitted to move this order to processing");
}

fn configure_list_for_buyer(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_orders()
        .withf(|query| query.participant_id == Some(10))
        .returning(|_| Ok(orders_response()));
    configure_orders(cfg, backend, identity_backend(buyer()));
}

fn configure_list_for_admin(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_orders()
        .withf(|query| query.participant_id.is_none())
        .returning(|_| Ok(orders_response()));
    configure_orders(cfg, backend, identity_backend(admin()));
}

fn configure_unknown_credential(cfg: &mut ServiceConfig) {
    let mut identity = MockBackend::new();
    identity.expect_resolve_credential().returning(|_| Ok(None));
    configure_orders(cfg, MockBackend::new(), identity);
}

fn configure_place_order(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend
        .expect_insert_order()
        .withf(|order| order.buyer_id == 10 && order.seller_id == 20 && order.items.len() == 1)
        .returning(|_| Ok(order_response()));
    backend.expect_create_chat_for_order().withf(|&order_id| order_id == 1).returning(|_| Ok(chat_response()));
    backend.expect_fetch_order_items().returning(|_| Ok(items_response()));
    configure_orders(cfg, backend, identity_backend(buyer()));
}

fn configure_update_order(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order().returning(|_| Ok(Some(order_response())));
    configure_orders(cfg, backend, identity_backend(buyer()));
}

fn configure_orders(cfg: &mut ServiceConfig, backend: MockBackend, identity: MockBackend) {
    let orders_api = OrderFlowApi::new(backend);
    let identity_api = IdentityApi::new(identity);
    cfg.app_data(web::Data::new(orders_api)).app_data(web::Data::new(identity_api)).service(
        web::scope("/api")
            .wrap(IdentityMiddlewareFactory::<MockBackend>::new())
            .service(PlaceOrderRoute::<MockBackend>::new())
            .service(MyOrdersRoute::<MockBackend>::new())
            .service(UpdateOrderRoute::<MockBackend>::new()),
    );
}

fn order_response() -> Order {
    Order {
        id: 1,
        buyer_id: 10,
        seller_id: 20,
        status: OrderStatus::Pending,
        total_amount: Money::from_cents(2000),
        notes: Some("gift wrap please".to_string()),
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

fn items_response() -> Vec<OrderItem> {
    vec![OrderItem { id: 1, order_id: 1, product_id: 100, quantity: 2, price: Money::from_cents(1000) }]
}

// Mock response to `fetch_orders` calls
fn orders_response() -> Vec<Order> {
    vec![
        Order {
            id: 1,
            buyer_id: 10,
            seller_id: 20,
            status: OrderStatus::Pending,
            total_amount: Money::from_cents(2000),
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
            completed_at: None,
        },
        Order {
            id: 2,
            buyer_id: 10,
            seller_id: 20,
            status: OrderStatus::Completed,
            total_amount: Money::from_cents(1500),
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 16, 11, 20, 0).unwrap(),
            completed_at: Some(Utc.with_ymd_and_hms(2024, 3, 16, 11, 20, 0).unwrap()),
        },
    ]
}

const ORDERS_JSON: &str = r#"[{"id":1,"buyer_id":10,"seller_id":20,"status":"pending","total_amount":2000,"notes":null,"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z","completed_at":null},{"id":2,"buyer_id":10,"seller_id":20,"status":"completed","total_amount":1500,"notes":null,"created_at":"2024-03-15T18:30:00Z","updated_at":"2024-03-16T11:20:00Z","completed_at":"2024-03-16T11:20:00Z"}]"#;

const ORDER_DETAIL_JSON: &str = r#"{"id":1,"buyer_id":10,"seller_id":20,"status":"pending","total_amount":2000,"notes":"gift wrap please","created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z","completed_at":null,"items":[{"id":1,"order_id":1,"product_id":100,"quantity":2,"price":1000}]}"#;
