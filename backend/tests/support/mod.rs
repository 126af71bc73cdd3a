//! Shared helpers for the HTTP integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`; each
//! pulls this module in with `mod support;` and drives the application
//! assembled by `build_app` over the in-memory store.

use std::net::SocketAddr;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::web;
use serde_json::{Value, json};

use portfolio_backend::inbound::http::health::HealthState;
use portfolio_backend::server::{AppDependencies, ServerConfig, build_app};

pub const PASSWORD: &str = "correct horse battery";

/// Status, headers and decoded JSON body of one response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Configuration with rate limiting switched off.
pub fn config() -> ServerConfig {
    ServerConfig::new(SocketAddr::from(([127, 0, 0, 1], 0))).with_rate_limit(0)
}

/// Initialise the full application for `config`, marked ready.
pub async fn init_app(
    config: ServerConfig,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    let deps = AppDependencies::from_config(&config, web::Data::new(HealthState::new()));
    deps.health_state.mark_ready();
    actix_test::init_service(build_app(deps)).await
}

/// Send `request` and decode the reply.
pub async fn send<S, B>(app: &S, request: TestRequest) -> Reply
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    Reply {
        status,
        headers,
        body,
    }
}

/// Attach `Authorization: Bearer <token>` when a token is given.
pub fn with_token(request: TestRequest, token: Option<&str>) -> TestRequest {
    match token {
        Some(token) => request.insert_header((AUTHORIZATION, format!("Bearer {token}"))),
        None => request,
    }
}

/// Register `email`, log in, and return `(user id, token)`.
pub async fn sign_up<S, B>(app: &S, email: &str) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let registered = send(
        app,
        TestRequest::post().uri("/api/v1/register").set_json(json!({
            "name": "Test User",
            "email": email,
            "password": PASSWORD,
            "password_confirmation": PASSWORD
        })),
    )
    .await;
    assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);

    let login = send(
        app,
        TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": email, "password": PASSWORD})),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK, "{}", login.body);

    (
        registered.body["data"]["id"]
            .as_str()
            .expect("user id")
            .to_owned(),
        login.body["token"].as_str().expect("token").to_owned(),
    )
}
