use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderItem, OrderStatus};

//--------------------------------------     Pagination     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset: Some(offset), limit: Some(limit) }
    }
}

//--------------------------------------  OrderQueryFilter  ---------------------------------------------------------
/// Criteria for fetching orders. An empty filter matches every order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    /// Restrict results to orders where this user is the buyer or the seller.
    pub participant_id: Option<i64>,
    pub status: Option<OrderStatus>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl OrderQueryFilter {
    pub fn for_participant(user_id: i64) -> Self {
        Self { participant_id: Some(user_id), ..Default::default() }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.participant_id.is_none() && self.status.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(id) = self.participant_id {
            write!(f, "participant={id} ")?;
        }
        if let Some(status) = self.status {
            write!(f, "status={status} ")?;
        }
        Ok(())
    }
}

//--------------------------------------     OrderDetail    ---------------------------------------------------------
/// An order together with its line items, in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
