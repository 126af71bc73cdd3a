//! Driving port for account lifecycle: registration, profile edits, removal.

use async_trait::async_trait;

use crate::domain::{Actor, Error, ProfileChanges, RegistrationInput, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountsCommand: Send + Sync {
    /// Register a new account.
    async fn register(&self, input: RegistrationInput) -> Result<User, Error>;

    /// Change the actor's own name and/or email.
    async fn update_profile(
        &self,
        actor: &Actor,
        target: &UserId,
        changes: ProfileChanges,
    ) -> Result<User, Error>;

    /// Delete the actor's own account, cascading to projects and tokens.
    async fn delete_account(&self, actor: &Actor, target: &UserId) -> Result<(), Error>;
}
