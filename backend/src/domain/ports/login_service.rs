//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to exchange credentials for a bearer token and
//! to resolve a presented token back into a user id.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, LoginCredentials, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a new token.
    ///
    /// Every mismatch yields the same `401` so callers cannot probe for
    /// registered emails.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error>;

    /// Resolve a presented token to its owner, or fail with `401`.
    async fn authenticate(&self, token: &AccessToken) -> Result<UserId, Error>;

    /// Invalidate a presented token.
    async fn logout(&self, token: &AccessToken) -> Result<(), Error>;
}
