//! # Database management and control.
//!
//! This module provides the interfaces that define the contract of the marketplace engine database
//! *backends*.
//!
//! ## Traits
//!
//! * [`OrderManagement`] owns the order ledger: placing orders (validating each line against the
//!   catalog and decrementing stock in the same transaction), reading them back, and driving status
//!   updates.
//! * [`ChatManagement`] owns the channel registry: the 1:1 chat bound to each order and the messages
//!   flowing through it.
//! * [`ReviewManagement`] owns review persistence and the seller-rating aggregate.
//! * [`CatalogGateway`] is the boundary to the product catalog: the engine only reads price, seller
//!   and stock, and decrements stock.
//! * [`IdentityManagement`] is the boundary to the identity provider: it resolves an opaque
//!   credential to a [`crate::db_types::Principal`] and nothing more.

mod catalog;
mod chat_management;
mod identity;
mod order_management;
mod review_management;

pub use catalog::{CatalogError, CatalogGateway};
pub use chat_management::{ChatManagement, ChatManagementError};
pub use identity::{IdentityError, IdentityManagement};
pub use order_management::{ModifyOrderRequest, OrderManagement, OrderManagementError};
pub use review_management::{ReviewManagement, ReviewManagementError};
