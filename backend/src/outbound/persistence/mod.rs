//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: database failures map to the port's persistence
//!   error; raw SQL messages are logged, not returned.
//!
//! # Example
//!
//! ```no_run
//! use portfolio_backend::outbound::persistence::{
//!     DbPool, DieselProjectRepository, PoolConfig,
//! };
//!
//! # async fn wire() -> Result<(), portfolio_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/portfolio")).await?;
//! let projects = DieselProjectRepository::new(pool);
//! # let _ = projects;
//! # Ok(())
//! # }
//! ```

mod diesel_access_token_repository;
mod diesel_basic_error_mapping;
mod diesel_project_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_access_token_repository::DieselAccessTokenRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::run_pending_migrations;
pub use pool::{DbPool, PoolConfig, PoolError, PoolState};
