//! # Bazaar engine public API
//!
//! The `api` module exposes the programmatic API for the marketplace engine. The API is modular, so
//! that clients can pick and choose the functionality they want, and different parts could be backed
//! by different stores.
//!
//! * [`OrderFlowApi`] drives the order lifecycle: placement (with catalog validation and the
//!   post-commit chat creation), role-scoped reads, and status transitions.
//! * [`ChatApi`] manages the per-order chat channel: reads, message posting and read receipts.
//! * [`ReviewApi`] handles review submission and the seller-rating aggregate.
//! * [`IdentityApi`] resolves opaque credentials to principals.
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a
//! database backend that implements the specific backend traits required by the API:
//!
//! ```rust,ignore
//! use bazaar_engine::{ChatApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements ChatManagement and OrderManagement
//! let api = ChatApi::new(db);
//! let chat = api.fetch_chat(&principal, chat_id).await?;
//! ```

pub mod errors;

mod chat_api;
mod identity_api;
mod order_flow_api;
mod review_api;

pub use chat_api::ChatApi;
pub use identity_api::IdentityApi;
pub use order_flow_api::OrderFlowApi;
pub use review_api::{ReviewApi, ReviewRequest};
