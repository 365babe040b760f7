use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use bazaar_engine::db_types::{Principal, Role};
use log::debug;

use super::mocks::MockBackend;
use crate::auth::CREDENTIAL_HEADER;

pub const BUYER_TOKEN: &str = "buyer-access-token";

/// The identity half of a test backend: resolves any credential to the given principal.
pub fn identity_backend(principal: Principal) -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_resolve_credential().returning(move |_| Ok(Some(principal.clone())));
    backend
}

pub fn buyer() -> Principal {
    Principal { id: 10, username: "alice".into(), role: Role::User, active: true }
}

pub fn seller() -> Principal {
    Principal { id: 20, username: "bob".into(), role: Role::Seller, active: true }
}

pub fn admin() -> Principal {
    Principal { id: 1, username: "root".into(), role: Role::Admin, active: true }
}

pub async fn get_request(
    credential: &str,
    path: &str,
    configure: impl FnOnce(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::get().uri(path);
    if !credential.is_empty() {
        req = req.insert_header((CREDENTIAL_HEADER, credential));
    }
    send_request(req, configure).await
}

pub async fn post_request(
    credential: &str,
    path: &str,
    body: serde_json::Value,
    configure: impl FnOnce(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post().uri(path).set_json(body);
    if !credential.is_empty() {
        req = req.insert_header((CREDENTIAL_HEADER, credential));
    }
    send_request(req, configure).await
}

pub async fn patch_request(
    credential: &str,
    path: &str,
    body: serde_json::Value,
    configure: impl FnOnce(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::patch().uri(path).set_json(body);
    if !credential.is_empty() {
        req = req.insert_header((CREDENTIAL_HEADER, credential));
    }
    send_request(req, configure).await
}

async fn send_request(
    req: TestRequest,
    configure: impl FnOnce(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = req.to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
