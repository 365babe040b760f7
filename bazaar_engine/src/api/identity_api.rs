use std::fmt::Debug;

use log::*;

use crate::{
    api::errors::IdentityApiError,
    db_types::Principal,
    traits::IdentityManagement,
};

/// `IdentityApi` is the thin boundary to the identity provider: it turns an opaque credential into
/// a [`Principal`] and rejects disabled accounts. Passwords and token internals never cross this
/// boundary.
pub struct IdentityApi<B> {
    db: B,
}

impl<B> Debug for IdentityApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IdentityApi")
    }
}

impl<B> IdentityApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> IdentityApi<B>
where B: IdentityManagement
{
    /// Resolve a credential to an active principal.
    pub async fn authenticate(&self, credential: &str) -> Result<Principal, IdentityApiError> {
        let principal =
            self.db.resolve_credential(credential).await?.ok_or(IdentityApiError::InvalidCredential)?;
        if !principal.active {
            debug!("🔑️ Rejected credential for disabled account {}", principal.username);
            return Err(IdentityApiError::AccountDisabled);
        }
        trace!("🔑️ Credential resolved to {} ({})", principal.username, principal.role);
        Ok(principal)
    }

    pub async fn principal_by_id(&self, user_id: i64) -> Result<Option<Principal>, IdentityApiError> {
        let principal = self.db.fetch_principal(user_id).await?;
        Ok(principal)
    }
}
