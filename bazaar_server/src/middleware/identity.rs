//! Credential-resolution middleware for the Bazaar Market Server.
//!
//! Place this middleware on any scope whose routes require an authenticated caller. It reads the
//! opaque credential from the `bms_access_token` header, resolves it through the identity API, and
//! inserts the resulting [`bazaar_engine::db_types::Principal`] into the request extensions, where
//! the [`crate::auth::AuthenticatedUser`] extractor picks it up. Requests without a valid
//! credential are rejected before they reach a handler.

use std::{marker::PhantomData, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    web,
    Error,
    HttpMessage,
};
use bazaar_engine::{traits::IdentityManagement, IdentityApi};
use futures::{
    future::{ok, Ready},
    Future,
};

use crate::{
    auth::CREDENTIAL_HEADER,
    errors::{AuthError, ServerError},
};

pub struct IdentityMiddlewareFactory<T> {
    _backend: PhantomData<fn() -> T>,
}

impl<T> IdentityMiddlewareFactory<T> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        IdentityMiddlewareFactory { _backend: PhantomData }
    }
}

impl<S, B, T> Transform<S, ServiceRequest> for IdentityMiddlewareFactory<T>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    T: IdentityManagement + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = IdentityMiddlewareService<S, T>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(IdentityMiddlewareService { service: Rc::new(service), _backend: PhantomData })
    }
}

pub struct IdentityMiddlewareService<S, T> {
    service: Rc<S>,
    _backend: PhantomData<fn() -> T>,
}

impl<S, B, T> Service<ServiceRequest> for IdentityMiddlewareService<S, T>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    T: IdentityManagement + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let api = req.app_data::<web::Data<IdentityApi<T>>>().cloned().ok_or_else(|| {
                log::warn!("No identity API found in app data");
                ErrorInternalServerError("No identity API found in app data")
            })?;
            let credential = req
                .headers()
                .get(CREDENTIAL_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
                .ok_or(ServerError::AuthenticationError(AuthError::MissingCredential))?;
            let principal = api.authenticate(&credential).await.map_err(ServerError::from)?;
            req.extensions_mut().insert(principal);
            service.call(req).await
        })
    }
}
