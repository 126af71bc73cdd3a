//! Port for project persistence.
//!
//! Adapters store [`Project`] aggregates verbatim. Ownership checks happen in
//! the domain before any mutation reaches this port.

use async_trait::async_trait;

use crate::domain::{Project, ProjectId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by project repository adapters.
    pub enum ProjectPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "project repository query failed: {message}",
    }
}

/// Storage contract for projects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// List projects, newest first with ties broken by id.
    ///
    /// When `owner` is set only that user's projects are returned.
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, ProjectPersistenceError>;

    /// Fetch a project by identifier.
    async fn find_by_id(&self, id: &ProjectId)
    -> Result<Option<Project>, ProjectPersistenceError>;

    /// Persist a newly created project.
    async fn insert(&self, project: &Project) -> Result<(), ProjectPersistenceError>;

    /// Overwrite the mutable columns of an existing project.
    ///
    /// Returns `false` when the row vanished between read and write.
    async fn update(&self, project: &Project) -> Result<bool, ProjectPersistenceError>;

    /// Remove a project. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &ProjectId) -> Result<bool, ProjectPersistenceError>;
}
