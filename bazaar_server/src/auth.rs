//! The server-side half of credential handling.
//!
//! The identity middleware (see [`crate::middleware`]) resolves the opaque credential in the
//! `bms_access_token` header through the engine's identity API and stashes the resulting
//! [`Principal`] in the request extensions. Handlers receive it through the [`AuthenticatedUser`]
//! extractor. No password or token internals ever reach this crate.

use std::ops::Deref;

use actix_web::{dev::Payload, error::ErrorInternalServerError, FromRequest, HttpMessage, HttpRequest};
use bazaar_engine::db_types::Principal;
use futures::future::{err, ok, Ready};
use log::warn;

/// The header carrying the caller's opaque credential.
pub const CREDENTIAL_HEADER: &str = "bms_access_token";

/// The principal resolved by the identity middleware, available to any handler under the `/api`
/// scope.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

impl Deref for AuthenticatedUser {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Principal>() {
            Some(principal) => ok(AuthenticatedUser(principal.clone())),
            None => {
                warn!("💻️ No principal found in request extensions. Is the identity middleware mounted?");
                err(ErrorInternalServerError("No principal found in request extensions"))
            },
        }
    }
}
