//! `SqliteDatabase` is a concrete implementation of a Bazaar marketplace engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module.
use std::fmt::Debug;

use bms_common::Money;
use log::*;
use sqlx::SqlitePool;

use super::db::{chats, messages, orders, products, reviews, users};
use crate::{
    chat_objects::ChatQueryFilter,
    db_types::{CatalogEntry, Chat, Message, NewMessage, NewOrder, NewReview, Order, OrderItem, Principal, Review},
    helpers::mean_rating,
    order_objects::{OrderQueryFilter, Pagination},
    traits::{
        CatalogError,
        CatalogGateway,
        ChatManagement,
        ChatManagementError,
        IdentityError,
        IdentityManagement,
        ModifyOrderRequest,
        OrderManagement,
        OrderManagementError,
        ReviewManagement,
        ReviewManagementError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = super::db::new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderManagement for SqliteDatabase {
    /// Validates the order against the identity and catalog surfaces, snapshots line prices,
    /// decrements stock, and persists the order and its items, all inside one transaction. A
    /// failure on any line rolls the whole operation back, including earlier decrements.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError> {
        let NewOrder { buyer_id, seller_id, notes, items } = order;
        let mut tx = self.pool.begin().await?;
        let seller =
            users::fetch_principal(seller_id, &mut tx).await?.ok_or(OrderManagementError::SellerNotFound(seller_id))?;
        if !seller.active || !seller.role.can_sell() {
            return Err(OrderManagementError::NotASeller(seller_id));
        }
        if buyer_id == seller_id {
            return Err(OrderManagementError::SelfTrade);
        }
        if items.is_empty() {
            return Err(OrderManagementError::EmptyOrder);
        }
        let mut total = Money::default();
        let mut lines = Vec::with_capacity(items.len());
        for item in &items {
            let product = products::fetch_product(item.product_id, &mut tx)
                .await?
                .ok_or(OrderManagementError::ProductNotFound(item.product_id))?;
            if product.seller_id != seller_id {
                return Err(OrderManagementError::ProductSellerMismatch(item.product_id));
            }
            products::decrement_quantity(item.product_id, item.quantity, &mut tx).await.map_err(|e| match e {
                CatalogError::InsufficientStock(id) => OrderManagementError::InsufficientStock(id),
                CatalogError::ProductNotFound(id) => OrderManagementError::ProductNotFound(id),
                CatalogError::DatabaseError(e) => OrderManagementError::DatabaseError(e),
            })?;
            total += product.price * item.quantity;
            lines.push((item.product_id, item.quantity, product.price));
        }
        let order = orders::insert_order(buyer_id, seller_id, notes.as_deref(), total, &mut tx).await?;
        for (product_id, quantity, price) in lines {
            orders::insert_order_item(order.id, product_id, quantity, price, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order #{} has been saved with a total of {total}", order.id);
        Ok(order)
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn update_order(&self, id: i64, update: ModifyOrderRequest) -> Result<Order, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order(id, update, &mut conn).await?;
        order.ok_or(OrderManagementError::OrderNotFound(id))
    }
}

impl ChatManagement for SqliteDatabase {
    async fn create_chat_for_order(&self, order_id: i64) -> Result<Chat, ChatManagementError> {
        let mut conn = self.pool.acquire().await?;
        if let Some(chat) = chats::fetch_chat_for_order(order_id, &mut conn).await? {
            trace!("🗃️ Chat for order {order_id} already exists with id {}", chat.id);
            return Ok(chat);
        }
        if orders::fetch_order(order_id, &mut conn).await?.is_none() {
            return Err(ChatManagementError::OrderNotFound(order_id));
        }
        match chats::insert_chat(order_id, &mut conn).await {
            Ok(chat) => {
                debug!("🗃️ Chat {} created for order {order_id}", chat.id);
                Ok(chat)
            },
            // Lost a concurrent creation race; the unique constraint on order_id guarantees a
            // winner exists, so re-read it.
            Err(e) if e.as_database_error().map(|d| d.is_unique_violation()).unwrap_or(false) => {
                chats::fetch_chat_for_order(order_id, &mut conn)
                    .await?
                    .ok_or_else(|| ChatManagementError::DatabaseError(format!("Chat for order {order_id} vanished")))
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_chat(&self, id: i64) -> Result<Option<Chat>, ChatManagementError> {
        let mut conn = self.pool.acquire().await?;
        let chat = chats::fetch_chat(id, &mut conn).await?;
        Ok(chat)
    }

    async fn fetch_chat_for_order(&self, order_id: i64) -> Result<Option<Chat>, ChatManagementError> {
        let mut conn = self.pool.acquire().await?;
        let chat = chats::fetch_chat_for_order(order_id, &mut conn).await?;
        Ok(chat)
    }

    async fn fetch_chats(&self, query: ChatQueryFilter) -> Result<Vec<Chat>, ChatManagementError> {
        let mut conn = self.pool.acquire().await?;
        let chats = chats::search_chats(query, &mut conn).await?;
        Ok(chats)
    }

    async fn fetch_messages(&self, chat_id: i64) -> Result<Vec<Message>, ChatManagementError> {
        let mut conn = self.pool.acquire().await?;
        let messages = messages::fetch_messages(chat_id, &mut conn).await?;
        Ok(messages)
    }

    async fn fetch_message(&self, id: i64) -> Result<Option<Message>, ChatManagementError> {
        let mut conn = self.pool.acquire().await?;
        let message = messages::fetch_message(id, &mut conn).await?;
        Ok(message)
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message, ChatManagementError> {
        let mut conn = self.pool.acquire().await?;
        let message = messages::insert_message(message, &mut conn).await?;
        trace!("🗃️ Message {} persisted in chat {}", message.id, message.chat_id);
        Ok(message)
    }

    async fn mark_message_read(&self, id: i64) -> Result<Message, ChatManagementError> {
        let mut conn = self.pool.acquire().await?;
        let message = messages::mark_read(id, &mut conn).await?;
        message.ok_or(ChatManagementError::MessageNotFound(id))
    }
}

impl ReviewManagement for SqliteDatabase {
    /// Persists the review and recomputes the seller's aggregate rating in the same transaction.
    async fn insert_review(&self, review: NewReview) -> Result<Review, ReviewManagementError> {
        let seller_id = review.seller_id;
        let mut tx = self.pool.begin().await?;
        let review = reviews::insert_review(review, &mut tx).await?;
        let ratings = reviews::fetch_ratings_for_seller(seller_id, &mut tx).await?;
        if let Some(rating) = mean_rating(&ratings) {
            users::update_seller_rating(seller_id, rating, &mut tx).await?;
            debug!("🗃️ Seller {seller_id} rating recomputed to {rating:.2} over {} reviews", ratings.len());
        }
        tx.commit().await?;
        Ok(review)
    }

    async fn review_exists(
        &self,
        reviewer_id: i64,
        product_id: i64,
        seller_id: i64,
    ) -> Result<bool, ReviewManagementError> {
        let mut conn = self.pool.acquire().await?;
        let exists = reviews::review_exists(reviewer_id, product_id, seller_id, &mut conn).await?;
        Ok(exists)
    }

    async fn fetch_reviews_for_product(
        &self,
        product_id: i64,
        pagination: &Pagination,
    ) -> Result<Vec<Review>, ReviewManagementError> {
        let mut conn = self.pool.acquire().await?;
        let reviews = reviews::fetch_reviews_for_product(product_id, pagination, &mut conn).await?;
        Ok(reviews)
    }

    async fn seller_rating(&self, seller_id: i64) -> Result<Option<f64>, ReviewManagementError> {
        let mut conn = self.pool.acquire().await?;
        let rating = users::fetch_seller_rating(seller_id, &mut conn).await?;
        Ok(rating)
    }
}

impl CatalogGateway for SqliteDatabase {
    async fn lookup_product(&self, product_id: i64) -> Result<Option<CatalogEntry>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let entry = products::fetch_product(product_id, &mut conn).await?;
        Ok(entry)
    }

    async fn decrement_quantity(&self, product_id: i64, amount: i64) -> Result<(), CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::decrement_quantity(product_id, amount, &mut conn).await
    }
}

impl IdentityManagement for SqliteDatabase {
    async fn resolve_credential(&self, credential: &str) -> Result<Option<Principal>, IdentityError> {
        let mut conn = self.pool.acquire().await?;
        let principal = users::fetch_principal_by_credential(credential, &mut conn).await?;
        Ok(principal)
    }

    async fn fetch_principal(&self, user_id: i64) -> Result<Option<Principal>, IdentityError> {
        let mut conn = self.pool.acquire().await?;
        let principal = users::fetch_principal(user_id, &mut conn).await?;
        Ok(principal)
    }
}
