use thiserror::Error;

use crate::db_types::Principal;

/// The boundary to the identity provider. A backend resolves an opaque credential to a
/// [`Principal`]; the engine and server never handle passwords or token internals.
#[allow(async_fn_in_trait)]
pub trait IdentityManagement: Clone {
    /// Resolves a credential to the principal it belongs to. Unknown credentials resolve to `None`;
    /// inactive principals are returned as-is and rejected by the caller.
    async fn resolve_credential(&self, credential: &str) -> Result<Option<Principal>, IdentityError>;

    async fn fetch_principal(&self, user_id: i64) -> Result<Option<Principal>, IdentityError>;
}

#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for IdentityError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
