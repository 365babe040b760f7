use thiserror::Error;

use crate::traits::{
    ChatManagementError,
    IdentityError,
    OrderManagementError,
    ReviewManagementError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Insufficient permissions. {0}")]
    NotPermitted(String),
    #[error(transparent)]
    OrderManagement(#[from] OrderManagementError),
    #[error(transparent)]
    ChatManagement(#[from] ChatManagementError),
}

#[derive(Debug, Clone, Error)]
pub enum ChatApiError {
    #[error("Chat {0} does not exist")]
    ChatNotFound(i64),
    #[error("Message {0} does not exist")]
    MessageNotFound(i64),
    #[error("Insufficient permissions. {0}")]
    NotPermitted(String),
    #[error("Message content cannot be empty")]
    EmptyMessage,
    #[error("A sender cannot mark their own message as read")]
    OwnMessage,
    #[error(transparent)]
    ChatManagement(#[from] ChatManagementError),
    #[error(transparent)]
    OrderManagement(#[from] OrderManagementError),
}

#[derive(Debug, Clone, Error)]
pub enum ReviewApiError {
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Insufficient permissions. {0}")]
    NotPermitted(String),
    #[error("Reviews can only be left on completed orders")]
    OrderNotCompleted,
    #[error("Rating must be an integer between 1 and 5, got {0}")]
    InvalidRating(i64),
    #[error("Product {0} was not part of the order")]
    ProductNotInOrder(i64),
    #[error("The given seller does not match the order")]
    SellerMismatch,
    #[error(transparent)]
    ReviewManagement(#[from] ReviewManagementError),
    #[error(transparent)]
    OrderManagement(#[from] OrderManagementError),
}

#[derive(Debug, Clone, Error)]
pub enum IdentityApiError {
    #[error("The credential does not resolve to a known principal")]
    InvalidCredential,
    #[error("The account is disabled")]
    AccountDisabled,
    #[error(transparent)]
    Identity(#[from] IdentityError),
}
