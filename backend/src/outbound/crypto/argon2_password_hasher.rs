//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are stored in PHC string format, so parameters and salt travel
//! with the hash and can be tuned later without invalidating accounts.
//! Hashing runs on Tokio's blocking pool so a login never stalls the
//! worker serving other requests.

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use async_trait::async_trait;
use rand_core::OsRng;
use tokio::task;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hasher with the crate's default parameters.
#[derive(Default, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` on the blocking pool with an owned copy of the password.
    async fn offload<T, F>(&self, password: &str, work: F) -> Result<T, PasswordHashError>
    where
        T: Send + 'static,
        F: FnOnce(&Argon2<'static>, &str) -> Result<T, PasswordHashError> + Send + 'static,
    {
        let argon2 = self.argon2.clone();
        let password = Zeroizing::new(password.to_owned());
        task::spawn_blocking(move || work(&argon2, password.as_str()))
            .await
            .map_err(|err| PasswordHashError::hash(format!("hashing task failed: {err}")))?
    }
}

fn hash_blocking(argon2: &Argon2<'_>, password: &str) -> Result<PasswordHash, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordHash::new(hash.to_string()))
        .map_err(|err| PasswordHashError::hash(err.to_string()))
}

fn verify_blocking(
    argon2: &Argon2<'_>,
    password: &str,
    encoded: &str,
) -> Result<bool, PasswordHashError> {
    let parsed = PhcHash::new(encoded).map_err(|err| {
        warn!(error = %err, "stored password hash failed to parse");
        PasswordHashError::malformed_hash(err.to_string())
    })?;
    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHashError::hash(err.to_string())),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        self.offload(password, hash_blocking).await
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let encoded = hash.as_ref().to_owned();
        self.offload(password, move |argon2, password| {
            verify_blocking(argon2, password, &encoded)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new()
    }

    #[rstest]
    #[tokio::test]
    async fn hashes_verify_against_their_password(hasher: Argon2PasswordHasher) {
        let hash = hasher.hash("correct horse").await.expect("hash");
        assert!(hash.as_ref().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).await.expect("verify"));
        assert!(!hasher.verify("battery staple", &hash).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn salts_differ_between_hashes(hasher: Argon2PasswordHasher) {
        let first = hasher.hash("same password").await.expect("hash");
        let second = hasher.hash("same password").await.expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hashes_are_reported(hasher: Argon2PasswordHasher) {
        let err = hasher
            .verify("anything", &PasswordHash::new("plaintext"))
            .await
            .expect_err("not a PHC string");
        assert!(matches!(err, PasswordHashError::MalformedHash { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn the_decoy_parses_and_matches_nothing(hasher: Argon2PasswordHasher) {
        for password in ["", "password123", "correct horse"] {
            let matched = hasher
                .verify(password, &PasswordHash::decoy())
                .await
                .expect("decoy is a valid Argon2id hash");
            assert!(!matched, "{password}");
        }
    }
}
