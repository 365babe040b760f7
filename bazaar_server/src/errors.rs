use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use bazaar_engine::{
    traits::{ChatManagementError, OrderManagementError, ReviewManagementError},
    ChatApiError,
    IdentityApiError,
    OrderFlowError,
    ReviewApiError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Invalid request. {0}")]
    ValidationError(String),
    #[error("Conflict. {0}")]
    Conflict(String),
    #[error("Unavailable. {0}")]
    Unavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingCredential => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredential => StatusCode::UNAUTHORIZED,
                AuthError::AccountDisabled => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No credential was provided with the request.")]
    MissingCredential,
    #[error("The credential does not resolve to a known principal.")]
    InvalidCredential,
    #[error("The account is disabled.")]
    AccountDisabled,
}

impl From<IdentityApiError> for ServerError {
    fn from(e: IdentityApiError) -> Self {
        match e {
            IdentityApiError::InvalidCredential => Self::AuthenticationError(AuthError::InvalidCredential),
            IdentityApiError::AccountDisabled => Self::AuthenticationError(AuthError::AccountDisabled),
            IdentityApiError::Identity(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<OrderManagementError> for ServerError {
    fn from(e: OrderManagementError) -> Self {
        match e {
            OrderManagementError::DatabaseError(e) => Self::BackendError(e),
            OrderManagementError::OrderNotFound(_) | OrderManagementError::SellerNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            OrderManagementError::ProductNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderManagementError::InsufficientStock(_) => Self::Unavailable(e.to_string()),
            OrderManagementError::NotASeller(_)
            | OrderManagementError::SelfTrade
            | OrderManagementError::EmptyOrder
            | OrderManagementError::ProductSellerMismatch(_) => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<ChatManagementError> for ServerError {
    fn from(e: ChatManagementError) -> Self {
        match e {
            ChatManagementError::DatabaseError(e) => Self::BackendError(e),
            ChatManagementError::ChatNotFound(_)
            | ChatManagementError::MessageNotFound(_)
            | ChatManagementError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::NotPermitted(reason) => Self::InsufficientPermissions(reason),
            OrderFlowError::OrderManagement(e) => e.into(),
            OrderFlowError::ChatManagement(e) => e.into(),
        }
    }
}

impl From<ChatApiError> for ServerError {
    fn from(e: ChatApiError) -> Self {
        match e {
            ChatApiError::ChatNotFound(_) | ChatApiError::MessageNotFound(_) => Self::NoRecordFound(e.to_string()),
            ChatApiError::NotPermitted(reason) => Self::InsufficientPermissions(reason),
            ChatApiError::EmptyMessage => Self::ValidationError(e.to_string()),
            ChatApiError::OwnMessage => Self::InsufficientPermissions(e.to_string()),
            ChatApiError::ChatManagement(e) => e.into(),
            ChatApiError::OrderManagement(e) => e.into(),
        }
    }
}

impl From<ReviewApiError> for ServerError {
    fn from(e: ReviewApiError) -> Self {
        match e {
            ReviewApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            ReviewApiError::NotPermitted(reason) => Self::InsufficientPermissions(reason),
            ReviewApiError::OrderNotCompleted
            | ReviewApiError::InvalidRating(_)
            | ReviewApiError::ProductNotInOrder(_)
            | ReviewApiError::SellerMismatch => Self::ValidationError(e.to_string()),
            ReviewApiError::ReviewManagement(e) => match e {
                ReviewManagementError::DuplicateReview => Self::Conflict(e.to_string()),
                ReviewManagementError::SellerNotFound(_) => Self::NoRecordFound(e.to_string()),
                ReviewManagementError::DatabaseError(e) => Self::BackendError(e),
            },
            ReviewApiError::OrderManagement(e) => e.into(),
        }
    }
}
