use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use bazaar_engine::{ChatApi, IdentityApi, OrderFlowApi, ReviewApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    fanout::ConnectionRegistry,
    middleware::IdentityMiddlewareFactory,
    routes::{
        health,
        ChatByIdRoute,
        CreateReviewRoute,
        MarkMessageReadRoute,
        MyChatsRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PlaceOrderRoute,
        PostMessageRoute,
        ProductReviewsRoute,
        UpdateOrderRoute,
    },
    ws::ChatStreamRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    // One registry for the whole process, shared by every worker.
    let registry = web::Data::new(ConnectionRegistry::default());
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let chat_api = ChatApi::new(db.clone());
        let review_api = ReviewApi::new(db.clone());
        let identity_api = IdentityApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bms::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(chat_api))
            .app_data(web::Data::new(review_api))
            .app_data(web::Data::new(identity_api))
            .app_data(registry.clone());
        // Routes that require a resolved credential
        let auth_scope = web::scope("/api")
            .wrap(IdentityMiddlewareFactory::<SqliteDatabase>::new())
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(CreateReviewRoute::<SqliteDatabase>::new())
            .service(UpdateOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(MyChatsRoute::<SqliteDatabase>::new())
            .service(PostMessageRoute::<SqliteDatabase>::new())
            .service(MarkMessageReadRoute::<SqliteDatabase>::new())
            .service(ChatByIdRoute::<SqliteDatabase>::new());
        // The realtime channel authorizes itself from the query credential, and the product review
        // listing is public; both live outside the credentialed scope.
        app.service(health)
            .service(ProductReviewsRoute::<SqliteDatabase>::new())
            .service(ChatStreamRoute::<SqliteDatabase>::new())
            .service(auth_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
