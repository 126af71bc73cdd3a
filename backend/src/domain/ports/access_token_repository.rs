//! Port for bearer token storage.
//!
//! Tokens are stored by digest only. Adapters never see the plain value.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{TokenDigest, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by access token repository adapters.
    pub enum AccessTokenPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

/// A stored token resolved back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    /// Record a freshly issued token.
    async fn issue(
        &self,
        digest: &TokenDigest,
        user_id: &UserId,
        issued_at: DateTime<Utc>,
    ) -> Result<(), AccessTokenPersistenceError>;

    /// Look a token up by digest, stamping its last use.
    async fn resolve(
        &self,
        digest: &TokenDigest,
        used_at: DateTime<Utc>,
    ) -> Result<Option<IssuedToken>, AccessTokenPersistenceError>;

    /// Delete a token. Returns `false` when it was unknown.
    async fn revoke(&self, digest: &TokenDigest) -> Result<bool, AccessTokenPersistenceError>;
}
