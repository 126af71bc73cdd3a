//! Identity domain service: registration, login, bearer tokens, profiles.
//!
//! Implements [`LoginService`], [`UserAccountsCommand`] and
//! [`UserProfileQuery`] over user and token repositories plus a password
//! hasher.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AccessTokenPersistenceError, AccessTokenRepository, LoginService, PasswordHashError,
    PasswordHasher, UserAccountsCommand, UserPersistenceError, UserProfileQuery, UserRepository,
};
use crate::domain::{
    AccessToken, Actor, EmailAddress, Error, FieldErrors, LoginCredentials, PasswordHash,
    ProfileChanges, Registration, RegistrationInput, User, UserAccount, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";
const UNAUTHENTICATED: &str = "unauthenticated";
const EMAIL_TAKEN: &str = "the email has already been taken";

/// Identity service wiring the account and token ports together.
#[derive(Clone)]
pub struct IdentityService<U, T, H> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
    token_ttl: Option<Duration>,
}

impl<U, T, H> IdentityService<U, T, H> {
    /// Create a service whose tokens never expire.
    pub fn new(users: Arc<U>, tokens: Arc<T>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            tokens,
            hasher,
            clock,
            token_ttl: None,
        }
    }

    /// Expire tokens `ttl` after issue.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.token_ttl = ttl;
        self
    }
}

impl<U, T, H> IdentityService<U, T, H>
where
    U: UserRepository,
    T: AccessTokenRepository,
    H: PasswordHasher,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail => Self::email_taken(),
        }
    }

    fn map_token_error(error: AccessTokenPersistenceError) -> Error {
        match error {
            AccessTokenPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("token repository unavailable: {message}"))
            }
            AccessTokenPersistenceError::Query { message } => {
                Error::internal(format!("token repository error: {message}"))
            }
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(error.to_string())
    }

    fn email_taken() -> Error {
        let mut errors = FieldErrors::new();
        errors.push("email", EMAIL_TAKEN);
        errors.into_error()
    }

    async fn is_email_taken(&self, email: &EmailAddress) -> Result<bool, Error> {
        self.users
            .email_exists(email)
            .await
            .map_err(Self::map_user_error)
    }

    async fn ensure_email_free(&self, email: &EmailAddress) -> Result<(), Error> {
        if self.is_email_taken(email).await? {
            return Err(Self::email_taken());
        }
        Ok(())
    }

    /// Field validation first, then uniqueness, reported in one error.
    async fn validate_registration(&self, input: RegistrationInput) -> Result<Registration, Error> {
        match Registration::validate(input) {
            Ok(registration) => {
                self.ensure_email_free(registration.email()).await?;
                Ok(registration)
            }
            Err(mut rejection) => {
                if let Some(email) = rejection.email().cloned() {
                    if self.is_email_taken(&email).await? {
                        rejection.push("email", EMAIL_TAKEN);
                    }
                }
                Err(rejection.into_error())
            }
        }
    }

    async fn load_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)
    }
}

#[async_trait]
impl<U, T, H> LoginService for IdentityService<U, T, H>
where
    U: UserRepository,
    T: AccessTokenRepository,
    H: PasswordHasher,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error> {
        let Some(account) = self
            .users
            .find_account_by_email(credentials.email())
            .await
            .map_err(Self::map_user_error)?
        else {
            // Pay the same hashing cost as a real mismatch.
            if let Err(err) = self
                .hasher
                .verify(credentials.password(), &PasswordHash::decoy())
                .await
            {
                warn!(error = %err, "decoy password verification failed");
            }
            debug!("login rejected: unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(Self::map_hash_error)?;
        if !matches {
            debug!(user_id = %account.user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let token = AccessToken::generate();
        self.tokens
            .issue(&token.digest(), account.user.id(), self.clock.utc())
            .await
            .map_err(Self::map_token_error)?;
        info!(user_id = %account.user.id(), "access token issued");
        Ok(token)
    }

    async fn authenticate(&self, token: &AccessToken) -> Result<UserId, Error> {
        let digest = token.digest();
        let now = self.clock.utc();
        let issued = self
            .tokens
            .resolve(&digest, now)
            .await
            .map_err(Self::map_token_error)?
            .ok_or_else(|| Error::unauthorized(UNAUTHENTICATED))?;

        if let Some(ttl) = self.token_ttl {
            if issued.created_at + ttl <= now {
                self.tokens
                    .revoke(&digest)
                    .await
                    .map_err(Self::map_token_error)?;
                debug!(user_id = %issued.user_id, "expired access token revoked");
                return Err(Error::unauthorized(UNAUTHENTICATED));
            }
        }
        Ok(issued.user_id)
    }

    async fn logout(&self, token: &AccessToken) -> Result<(), Error> {
        let revoked = self
            .tokens
            .revoke(&token.digest())
            .await
            .map_err(Self::map_token_error)?;
        if !revoked {
            return Err(Error::unauthorized(UNAUTHENTICATED));
        }
        Ok(())
    }
}

#[async_trait]
impl<U, T, H> UserAccountsCommand for IdentityService<U, T, H>
where
    U: UserRepository,
    T: AccessTokenRepository,
    H: PasswordHasher,
{
    async fn register(&self, input: RegistrationInput) -> Result<User, Error> {
        let registration = self.validate_registration(input).await?;

        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(Self::map_hash_error)?;
        let now = self.clock.utc();
        let user = User::new(
            UserId::random(),
            registration.name().clone(),
            registration.email().clone(),
            now,
            now,
        );
        let account = UserAccount {
            user,
            password_hash,
        };
        self.users
            .insert(&account)
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %account.user.id(), "user registered");
        Ok(account.user)
    }

    async fn update_profile(
        &self,
        actor: &Actor,
        target: &UserId,
        changes: ProfileChanges,
    ) -> Result<User, Error> {
        let user_id = actor.require_self(target)?;
        let current = self
            .load_user(&user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;

        if let Some(email) = changes.email.as_ref().filter(|email| *email != current.email()) {
            self.ensure_email_free(email).await?;
        }

        let updated = current.with_profile(changes.name, changes.email, self.clock.utc());
        let stored = self
            .users
            .update_profile(&updated)
            .await
            .map_err(Self::map_user_error)?;
        if !stored {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }
        Ok(updated)
    }

    async fn delete_account(&self, actor: &Actor, target: &UserId) -> Result<(), Error> {
        let user_id = actor.require_self(target)?;
        let deleted = self
            .users
            .delete(&user_id)
            .await
            .map_err(Self::map_user_error)?;
        if !deleted {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }
        info!(user_id = %user_id, "user account deleted");
        Ok(())
    }
}

#[async_trait]
impl<U, T, H> UserProfileQuery for IdentityService<U, T, H>
where
    U: UserRepository,
    T: AccessTokenRepository,
    H: PasswordHasher,
{
    async fn current_user(&self, actor: &Actor) -> Result<User, Error> {
        let user_id = actor.require_user()?;
        self.load_user(&user_id)
            .await?
            .ok_or_else(|| Error::unauthorized(UNAUTHENTICATED))
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
