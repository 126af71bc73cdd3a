//! Driving port for reading projects.
//!
//! Reads are public. The actor only matters when the caller asks for their
//! own projects.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Project, ProjectId};

/// Which projects a listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectScope {
    /// Every project in the store.
    #[default]
    All,
    /// Only projects owned by the acting user.
    Mine,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectsQuery: Send + Sync {
    /// List projects newest first.
    async fn list(&self, actor: &Actor, scope: ProjectScope) -> Result<Vec<Project>, Error>;

    /// Fetch a single project or fail with `404`.
    async fn get(&self, actor: &Actor, id: &ProjectId) -> Result<Project, Error>;
}
