//! Driving port for reading the authenticated user's profile.

use async_trait::async_trait;

use crate::domain::{Actor, Error, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the acting user, or `401` when anonymous.
    async fn current_user(&self, actor: &Actor) -> Result<User, Error>;
}
