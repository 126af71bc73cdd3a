//! Bearer token extraction.
//!
//! Every handler that cares about identity takes an [`ActorContext`]. The
//! extractor reads `Authorization: Bearer <token>` and resolves it through
//! the [`LoginService`](crate::domain::ports::LoginService) port. A missing,
//! malformed, unknown or expired token yields [`Actor::Anonymous`]; the
//! domain then answers `401` wherever authentication is required, so public
//! reads keep working for clients holding a stale token.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{AccessToken, Actor, Error, ErrorCode};

use super::state::HttpState;

const BEARER: &str = "bearer";

/// The acting identity for one request, plus the token that proved it.
#[derive(Debug, Clone)]
pub struct ActorContext {
    actor: Actor,
    token: Option<AccessToken>,
}

impl ActorContext {
    fn anonymous() -> Self {
        Self {
            actor: Actor::Anonymous,
            token: None,
        }
    }

    /// Identity passed to domain services.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// The verified bearer token, or `401` when the request is anonymous.
    pub fn require_token(&self) -> Result<&AccessToken, Error> {
        self.token
            .as_ref()
            .ok_or_else(|| Error::unauthorized("unauthenticated"))
    }
}

/// Pull the token out of an `Authorization: Bearer` header.
fn bearer_token(req: &HttpRequest) -> Option<AccessToken> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return None;
    }
    AccessToken::parse(token)
}

impl FromRequest for ActorContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let Some(token) = token else {
                return Ok(Self::anonymous());
            };
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            match state.login.authenticate(&token).await {
                Ok(user_id) => Ok(Self {
                    actor: Actor::User(user_id),
                    token: Some(token),
                }),
                Err(error) if error.code() == ErrorCode::Unauthorized => {
                    debug!("bearer token rejected; treating request as anonymous");
                    Ok(Self::anonymous())
                }
                Err(error) => Err(error.into()),
            }
        })
    }
}
