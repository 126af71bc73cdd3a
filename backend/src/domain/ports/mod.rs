//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Query`, `*Command`, `LoginService`) are what inbound
//! adapters call. Driven ports (`*Repository`, `PasswordHasher`) are what
//! domain services call and outbound adapters implement.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token_repository;
mod login_service;
mod password_hasher;
mod project_repository;
mod projects_command;
mod projects_query;
mod user_accounts_command;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use access_token_repository::MockAccessTokenRepository;
pub use access_token_repository::{
    AccessTokenPersistenceError, AccessTokenRepository, IssuedToken,
};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectPersistenceError, ProjectRepository};
#[cfg(test)]
pub use projects_command::MockProjectsCommand;
pub use projects_command::ProjectsCommand;
#[cfg(test)]
pub use projects_query::MockProjectsQuery;
pub use projects_query::{ProjectScope, ProjectsQuery};
#[cfg(test)]
pub use user_accounts_command::MockUserAccountsCommand;
pub use user_accounts_command::UserAccountsCommand;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
