//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat
//! and tidy 🙏
//!
//! Handlers stay generic over the backend traits so that endpoint tests can run them against mocked
//! backends; the `route!` macro generates the concrete `HttpServiceFactory` for each of them.

use actix_web::{get, web, HttpResponse, Responder};
use bazaar_engine::{
    db_types::{NewOrder, OrderStatus},
    order_objects::Pagination,
    traits::{ChatManagement, ModifyOrderRequest, OrderManagement, ReviewManagement},
    ChatApi,
    OrderFlowApi,
    ReviewApi,
    ReviewRequest,
};
use log::*;

use crate::{
    auth::AuthenticatedUser,
    data_objects::{ChatEvent, NewMessageParams, NewOrderParams, NewReviewParams, UpdateOrderParams},
    errors::ServerError,
    fanout::ConnectionRegistry,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>); }
        paste::paste! {
            impl<B> [<$name:camel Route>]<B> {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self(core::marker::PhantomData)
                }
            }
        }
        paste::paste! {
            impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
            where
                B: $($bounds +)+ 'static,
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name::<B>);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/orders" impl OrderManagement, ChatManagement);
/// Route handler for placing a new order.
///
/// The acting principal is always the buyer. Validation, price snapshotting and stock adjustment
/// happen atomically in the engine; the order's chat is created as a post-commit step.
pub async fn place_order<B: OrderManagement + ChatManagement>(
    user: AuthenticatedUser,
    body: web::Json<NewOrderParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ POST order for seller {} with {} items from {}", params.seller_id, params.items.len(), user.username);
    let mut order = NewOrder::new(user.id, params.seller_id, params.items.into_iter().map(Into::into).collect());
    if let Some(notes) = params.notes {
        order = order.with_notes(notes);
    }
    let detail = api.place_order(&user.0, order).await?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(my_orders => Get "/orders" impl OrderManagement, ChatManagement);
/// Role-scoped order listing: admins see all orders, everyone else only the orders where they are
/// the buyer or the seller.
pub async fn my_orders<B: OrderManagement + ChatManagement>(
    user: AuthenticatedUser,
    pagination: web::Query<Pagination>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for {}", user.username);
    let orders = api.fetch_orders(&user.0, pagination.into_inner()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderManagement, ChatManagement);
pub async fn order_by_id<B: OrderManagement + ChatManagement>(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for {}", user.username);
    let detail = api.fetch_order(&user.0, order_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(update_order => Patch "/orders/{id}" impl OrderManagement, ChatManagement);
/// Route handler for order updates.
///
/// A status change is authorized against the permitted-transition table; notes can be changed by
/// any participant. Unknown status values are rejected before the engine is consulted.
pub async fn update_order<B: OrderManagement + ChatManagement>(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<UpdateOrderParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let params = body.into_inner();
    debug!("💻️ PATCH order {order_id} by {}: {params:?}", user.username);
    let mut update = ModifyOrderRequest::default();
    if let Some(status) = params.status {
        let status = status.parse::<OrderStatus>().map_err(|e| ServerError::ValidationError(e.to_string()))?;
        update = update.with_status(status);
    }
    if let Some(notes) = params.notes {
        update = update.with_notes(notes);
    }
    let order = api.update_order(&user.0, order_id, update).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Reviews  ----------------------------------------------------
route!(create_review => Post "/orders/{id}/reviews" impl ReviewManagement, OrderManagement);
/// Route handler for submitting a review against a completed order.
pub async fn create_review<B: ReviewManagement + OrderManagement>(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<NewReviewParams>,
    api: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let params = body.into_inner();
    debug!("💻️ POST review for order {order_id} from {}", user.username);
    let request = ReviewRequest {
        product_id: params.product_id,
        seller_id: params.seller_id,
        rating: params.rating,
        comment: params.comment,
    };
    let review = api.submit_review(&user.0, order_id, request).await?;
    Ok(HttpResponse::Ok().json(review))
}

route!(product_reviews => Get "/orders/reviews/{product_id}" impl ReviewManagement, OrderManagement);
/// Public listing of a product's reviews, newest first. No credential required.
pub async fn product_reviews<B: ReviewManagement + OrderManagement>(
    path: web::Path<i64>,
    pagination: web::Query<Pagination>,
    api: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ GET reviews for product {product_id}");
    let reviews = api.product_reviews(product_id, pagination.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

//----------------------------------------------   Chats  ----------------------------------------------------
route!(my_chats => Get "/chats" impl ChatManagement, OrderManagement);
/// Role-scoped chat listing, same visibility rule as orders.
pub async fn my_chats<B: ChatManagement + OrderManagement>(
    user: AuthenticatedUser,
    pagination: web::Query<Pagination>,
    api: web::Data<ChatApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET chats for {}", user.username);
    let chats = api.fetch_chats(&user.0, pagination.into_inner()).await?;
    Ok(HttpResponse::Ok().json(chats))
}

route!(chat_by_id => Get "/chats/{id}" impl ChatManagement, OrderManagement);
/// A chat with its message history. Only participants of the parent order and admins may read it.
pub async fn chat_by_id<B: ChatManagement + OrderManagement>(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    api: web::Data<ChatApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let chat_id = path.into_inner();
    debug!("💻️ GET chat {chat_id} for {}", user.username);
    let detail = api.fetch_chat(&user.0, chat_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(post_message => Post "/chats/messages" impl ChatManagement, OrderManagement);
/// Route handler for posting a chat message over HTTP.
///
/// The message is persisted first and then fanned out, best effort, to the other connected
/// participants of the chat. Delivery failures never fail the request; a disconnected participant
/// reads the message later through the ordinary chat read path.
pub async fn post_message<B: ChatManagement + OrderManagement>(
    user: AuthenticatedUser,
    body: web::Json<NewMessageParams>,
    api: web::Data<ChatApi<B>>,
    registry: web::Data<ConnectionRegistry>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ POST message to chat {} from {}", params.chat_id, user.username);
    let message = api.post_message(&user.0, params.chat_id, &params.content).await?;
    registry.broadcast(message.chat_id, &ChatEvent::from_message(&message, &user.0), Some(user.id));
    Ok(HttpResponse::Ok().json(message))
}

route!(mark_message_read => Post "/chats/messages/{id}/read" impl ChatManagement, OrderManagement);
/// Marks a message as read. Senders cannot acknowledge their own messages; for everyone else the
/// call is idempotent.
pub async fn mark_message_read<B: ChatManagement + OrderManagement>(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    api: web::Data<ChatApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let message_id = path.into_inner();
    debug!("💻️ POST read receipt for message {message_id} from {}", user.username);
    let message = api.mark_read(&user.0, message_id).await?;
    Ok(HttpResponse::Ok().json(message))
}
