use std::{fmt::Display, str::FromStr};

pub use bms_common::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------        Role        ---------------------------------------------------------
/// The role a principal holds on the marketplace. Buyers hold the `User` role; `Seller` and `Admin`
/// principals may also act as sellers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Seller,
    Admin,
}

impl Role {
    /// Whether a principal with this role may be the selling party of an order.
    pub fn can_sell(&self) -> bool {
        matches!(self, Role::Seller | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Seller => write!(f, "seller"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//--------------------------------------     Principal      ---------------------------------------------------------
/// The resolved identity behind an opaque credential. The engine never sees passwords or token
/// internals; an identity backend maps a credential onto this record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(rename = "is_active")]
    pub active: bool,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

//--------------------------------------    OrderStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// The order has been placed and is awaiting the seller.
    Pending,
    /// The seller has accepted the order and is working on delivery.
    Processing,
    /// The buyer has confirmed delivery. Reviews become possible in this state.
    Completed,
    /// The order was called off by the buyer, the seller, or an admin.
    Cancelled,
    /// An admin reversed a completed order.
    Refunded,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    /// The sum of `price * quantity` over the order's items, captured at placement and frozen
    /// thereafter.
    pub total_amount: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

//--------------------------------------      NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub buyer_id: i64,
    pub seller_id: i64,
    /// Free-text notes supplied by the buyer at placement.
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(buyer_id: i64, seller_id: i64, items: Vec<NewOrderItem>) -> Self {
        Self { buyer_id, seller_id, notes: None, items }
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
}

//--------------------------------------     OrderItem      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Snapshot of the catalog price at order time, immune to later catalog price changes.
    pub price: Money,
}

//--------------------------------------        Chat        ---------------------------------------------------------
/// The single messaging channel bound 1:1 to an order. Created the first time the order is
/// successfully placed, deleted only with its order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub order_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Message       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub chat_id: i64,
    pub sender_id: i64,
    pub content: String,
}

impl NewMessage {
    pub fn new<S: Into<String>>(chat_id: i64, sender_id: i64, content: S) -> Self {
        Self { chat_id, sender_id, content: content.into() }
    }
}

//--------------------------------------      Review        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub reviewer_id: i64,
    pub seller_id: i64,
    pub product_id: i64,
    /// Integer rating in [1, 5].
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub reviewer_id: i64,
    pub seller_id: i64,
    pub product_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

//--------------------------------------    CatalogEntry    ---------------------------------------------------------
/// The catalog gateway's view of a product: just enough to price an order line and adjust stock.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub seller_id: i64,
    pub price: Money,
    pub quantity: i64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_status_round_trip() {
        for status in
            [OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Completed, OrderStatus::Cancelled, OrderStatus::Refunded]
        {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("paid".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn role_capabilities() {
        assert!(!Role::User.can_sell());
        assert!(Role::Seller.can_sell());
        assert!(Role::Admin.can_sell());
        assert!("seller".parse::<Role>().unwrap().can_sell());
        assert!("superuser".parse::<Role>().is_err());
    }
}
