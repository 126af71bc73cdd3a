//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! layers, and the services that enforce the portfolio's rules. Handlers
//! never touch repositories directly; they call the driving ports in
//! [`ports`] with an explicit [`Actor`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `User`, `Project` and their validated field types.
//! - `Actor`, `can`, `authorize`: the project authorization gate.
//! - `ProjectService`, `IdentityService`: port implementations.

pub mod auth;
pub mod authorization;
pub mod error;
mod identity_service;
pub mod ports;
pub mod project;
mod project_service;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::auth::{
    AccessToken, LoginCredentials, LoginValidationError, PASSWORD_MIN, PasswordHash,
    ProfileChanges, Registration, RegistrationInput, RegistrationRejection, TokenDigest,
    UserAccount,
};
pub use self::authorization::{Actor, ProjectOperation, authorize, can};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity_service::IdentityService;
pub use self::project::{
    DESCRIPTION_MAX, LINK_MAX, Patch, Project, ProjectDescription, ProjectDraft, ProjectId,
    ProjectInput, ProjectLink, ProjectPatch, ProjectRecord, ProjectStatus, ProjectTitle,
    ProjectValidationError, TITLE_MAX,
};
pub use self::project_service::ProjectService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, EmailAddress, USER_NAME_MAX, User, UserId, UserName, UserValidationError,
};
pub use self::validation::FieldErrors;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use portfolio_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
