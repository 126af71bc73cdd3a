//! Driving port for project mutations.
//!
//! Inputs arrive unvalidated; implementations authorise the actor before
//! validating so that `401`/`404`/`403` outrank `422`.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Project, ProjectId, ProjectInput};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectsCommand: Send + Sync {
    /// Create a project owned by the actor.
    async fn create(&self, actor: &Actor, input: ProjectInput) -> Result<Project, Error>;

    /// Apply a partial update to a project the actor owns.
    async fn update(
        &self,
        actor: &Actor,
        id: &ProjectId,
        input: ProjectInput,
    ) -> Result<Project, Error>;

    /// Delete a project the actor owns.
    async fn delete(&self, actor: &Actor, id: &ProjectId) -> Result<(), Error>;
}
