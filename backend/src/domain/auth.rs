//! Authentication primitives: credentials, registration input, bearer tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{EmailAddress, Error, FieldErrors, User, UserName};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 8;
const TOKEN_BYTES: usize = 32;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "the email field is required"),
            Self::EmptyPassword => write!(f, "the password field is required"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased and non-empty. It is not format checked
///   so malformed addresses fail as ordinary bad credentials.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use portfolio_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com", "secret").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw registration fields as received from a client.
#[derive(Debug, Default, Clone)]
pub struct RegistrationInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub password_confirmation: Option<Zeroizing<String>>,
}

/// Registration request that passed field validation.
///
/// Email uniqueness is a store concern and is checked by the identity
/// service, which reports it against the same `email` field.
#[derive(Debug, Clone)]
pub struct Registration {
    name: UserName,
    email: EmailAddress,
    password: Zeroizing<String>,
}

/// Registration that failed field validation.
///
/// Keeps the email when it parsed so the uniqueness check can still be
/// reported alongside the other failures.
#[derive(Debug, Clone)]
pub struct RegistrationRejection {
    errors: FieldErrors,
    email: Option<EmailAddress>,
}

impl RegistrationRejection {
    /// Email address that passed format validation, if any.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Record an extra failure against `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(field, message);
    }

    /// Convert into a validation error listing every field.
    #[must_use]
    pub fn into_error(self) -> Error {
        self.errors.into_error()
    }
}

impl Registration {
    /// Validate every registration field, reporting all failures together.
    pub fn validate(input: RegistrationInput) -> Result<Self, RegistrationRejection> {
        let mut errors = FieldErrors::new();
        let name = match input.name {
            Some(raw) => errors.check("name", UserName::new(raw)),
            None => {
                errors.push("name", "the name field is required");
                None
            }
        };
        let email = match input.email {
            Some(raw) => errors.check("email", EmailAddress::new(raw)),
            None => {
                errors.push("email", "the email field is required");
                None
            }
        };
        let password = check_password(&mut errors, input.password, input.password_confirmation);

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) if errors.is_empty() => Ok(Self {
                name,
                email,
                password,
            }),
            (_, email, _) => Err(RegistrationRejection { errors, email }),
        }
    }

    /// Validated display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Normalised email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plain-text password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

fn check_password(
    errors: &mut FieldErrors,
    password: Option<Zeroizing<String>>,
    confirmation: Option<Zeroizing<String>>,
) -> Option<Zeroizing<String>> {
    let Some(password) = password.filter(|value| !value.is_empty()) else {
        errors.push("password", "the password field is required");
        return None;
    };
    let mut valid = true;
    if password.chars().count() < PASSWORD_MIN {
        errors.push(
            "password",
            format!("the password must be at least {PASSWORD_MIN} characters"),
        );
        valid = false;
    }
    if confirmation.as_deref() != Some(&*password) {
        errors.push("password", "the password confirmation does not match");
        valid = false;
    }
    valid.then_some(password)
}

/// Requested change to the caller's own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<UserName>,
    pub email: Option<EmailAddress>,
}

impl ProfileChanges {
    /// Validate optional name/email inputs. Absent fields are left unchanged.
    pub fn validate(name: Option<String>, email: Option<String>) -> Result<Self, Error> {
        let mut errors = FieldErrors::new();
        let name = name.and_then(|raw| errors.check("name", UserName::new(raw)));
        let email = email.and_then(|raw| errors.check("email", EmailAddress::new(raw)));
        errors.into_result()?;
        Ok(Self { name, email })
    }
}

/// Well-formed Argon2id hash with default cost that matches no password.
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$cG9ydGZvbGlvLWRlY295IQ$\
                          AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// PHC-formatted password hash as stored alongside the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a password hasher.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Hash verified when a login names no account, so unknown and known
    /// emails cost the same.
    #[must_use]
    pub fn decoy() -> Self {
        Self::new(DECOY_HASH)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// A stored user together with their credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: PasswordHash,
}

/// Opaque bearer token handed to a client at login.
///
/// Only the SHA-256 [`TokenDigest`] is persisted; the plain value exists in
/// memory for the duration of the login response or an incoming request.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Generate a new token from 32 bytes of OS randomness, hex encoded.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; TOKEN_BYTES]);
        OsRng.fill_bytes(bytes.as_mut_slice());
        Self(Zeroizing::new(hex::encode(bytes.as_slice())))
    }

    /// Wrap a token presented by a client; blank values are rejected.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Digest under which the token is stored.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }

    /// Plain token value for the login response.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 fingerprint of an [`AccessToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Rehydrate a digest read back from storage.
    #[must_use]
    pub fn from_stored(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }
}

impl AsRef<str> for TokenDigest {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
