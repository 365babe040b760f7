//! Bazaar Market Engine
//!
//! The Bazaar Market Engine contains the core logic for the marketplace backend: the order transaction
//! lifecycle, the per-order chat channel, and review aggregation. It is provider-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never
//!    need to access the database directly. Instead, use the public API provided by the engine. The
//!    exception is the data types used in the database. These are defined in the [`db_types`] module and
//!    are public.
//! 2. The engine public API ([`mod@api`]). This provides the public-facing functionality of the engine:
//!    placing orders and driving their status lifecycle, the chat channel bound to each order, and
//!    review submission with seller-rating aggregation. Specific backends need to implement the traits
//!    in the [`traits`] module in order to act as a backend for the Bazaar Market Server.
//!
//! Authorization is centralized in the [`authz`] module: every operation that depends on the actor's
//! relationship to an order (buyer, seller, or admin) resolves that relationship once and consults a
//! single permitted-transition table.

pub mod authz;
pub mod chat_objects;
pub mod db_types;
pub mod helpers;
pub mod order_objects;
pub mod traits;

mod api;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{
    errors::{ChatApiError, IdentityApiError, OrderFlowError, ReviewApiError},
    ChatApi,
    IdentityApi,
    OrderFlowApi,
    ReviewApi,
    ReviewRequest,
};
