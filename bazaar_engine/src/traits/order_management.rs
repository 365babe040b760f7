use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderItem, OrderStatus},
    order_objects::OrderQueryFilter,
};

/// Order ledger behaviour that a backend must expose.
///
/// Placing an order is the one operation here that spans multiple writes: every stock decrement and
/// the order + item inserts must commit in a single atomic transaction, so that a failure on any
/// line leaves the catalog untouched.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// Validates and persists a new order.
    ///
    /// Validation order: the seller must resolve to an active seller-or-admin principal, must not be
    /// the buyer, the item list must be non-empty, and every line must reference a product that
    /// exists, belongs to the seller, and has sufficient stock. Line prices are snapshotted from the
    /// catalog at this moment. On success the order is `Pending` and stock has been decremented.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError>;

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderManagementError>;

    /// Items are returned in submission order.
    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError>;

    /// Fetches orders according to the criteria in the filter, ordered by creation time.
    async fn fetch_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderManagementError>;

    /// Applies the given update to an order. When the new status is `Completed`, the backend stamps
    /// `completed_at`. The total amount is never touched.
    async fn update_order(&self, id: i64, update: ModifyOrderRequest) -> Result<Order, OrderManagementError>;
}

#[derive(Debug, Clone, Default)]
pub struct ModifyOrderRequest {
    pub new_status: Option<OrderStatus>,
    pub new_notes: Option<String>,
}

impl ModifyOrderRequest {
    pub fn is_empty(&self) -> bool {
        self.new_status.is_none() && self.new_notes.is_none()
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.new_status = Some(status);
        self
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.new_notes = Some(notes.into());
        self
    }

    /// The timestamp to stamp on the order when this update completes it.
    pub fn completion_time(&self) -> Option<DateTime<Utc>> {
        matches!(self.new_status, Some(OrderStatus::Completed)).then(Utc::now)
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Seller {0} does not exist")]
    SellerNotFound(i64),
    #[error("User {0} is not a seller")]
    NotASeller(i64),
    #[error("Buyers cannot place an order with themselves")]
    SelfTrade,
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Product {0} does not belong to the requested seller")]
    ProductSellerMismatch(i64),
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(i64),
}

impl From<sqlx::Error> for OrderManagementError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
