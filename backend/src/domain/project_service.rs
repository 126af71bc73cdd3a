//! Project domain service.
//!
//! Implements the project driving ports on top of a [`ProjectRepository`],
//! routing every mutation through the authorization gate first.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ProjectPersistenceError, ProjectRepository, ProjectScope, ProjectsCommand, ProjectsQuery,
};
use crate::domain::{
    Actor, Error, Project, ProjectDraft, ProjectId, ProjectInput, ProjectOperation, ProjectPatch,
    authorize,
};

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Update,
    Delete,
}

impl Mutation {
    fn on(self, project: &Project) -> ProjectOperation<'_> {
        match self {
            Self::Update => ProjectOperation::Update(project),
            Self::Delete => ProjectOperation::Delete(project),
        }
    }
}

/// Project service implementing [`ProjectsQuery`] and [`ProjectsCommand`].
#[derive(Clone)]
pub struct ProjectService<R> {
    projects: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ProjectService<R> {
    /// Create a new service over the given repository and clock.
    pub fn new(projects: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { projects, clock }
    }
}

impl<R> ProjectService<R>
where
    R: ProjectRepository,
{
    fn map_persistence_error(error: ProjectPersistenceError) -> Error {
        match error {
            ProjectPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("project repository unavailable: {message}"))
            }
            ProjectPersistenceError::Query { message } => {
                Error::internal(format!("project repository error: {message}"))
            }
        }
    }

    fn project_not_found(id: &ProjectId) -> Error {
        Error::not_found(format!("project {id} not found"))
    }

    async fn load(&self, id: &ProjectId) -> Result<Project, Error> {
        self.projects
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::project_not_found(id))
    }

    /// Authentication, then existence, then ownership.
    async fn load_for_mutation(
        &self,
        actor: &Actor,
        id: &ProjectId,
        mutation: Mutation,
    ) -> Result<Project, Error> {
        actor.require_user()?;
        let project = self.load(id).await?;
        authorize(actor, mutation.on(&project))?;
        Ok(project)
    }
}

#[async_trait]
impl<R> ProjectsQuery for ProjectService<R>
where
    R: ProjectRepository,
{
    async fn list(&self, actor: &Actor, scope: ProjectScope) -> Result<Vec<Project>, Error> {
        authorize(actor, ProjectOperation::Read)?;
        let owner = match scope {
            ProjectScope::All => None,
            ProjectScope::Mine => Some(actor.require_user()?),
        };
        self.projects
            .list(owner)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn get(&self, actor: &Actor, id: &ProjectId) -> Result<Project, Error> {
        authorize(actor, ProjectOperation::Read)?;
        self.load(id).await
    }
}

#[async_trait]
impl<R> ProjectsCommand for ProjectService<R>
where
    R: ProjectRepository,
{
    async fn create(&self, actor: &Actor, input: ProjectInput) -> Result<Project, Error> {
        authorize(actor, ProjectOperation::Create)?;
        let owner = actor.require_user()?;
        let draft = ProjectDraft::validate(input)?;
        let project = Project::create(ProjectId::random(), draft, owner, self.clock.utc());
        self.projects
            .insert(&project)
            .await
            .map_err(Self::map_persistence_error)?;
        info!(project_id = %project.id(), owner = %owner, "project created");
        Ok(project)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: &ProjectId,
        input: ProjectInput,
    ) -> Result<Project, Error> {
        let project = self
            .load_for_mutation(actor, id, Mutation::Update)
            .await?;
        let patch = ProjectPatch::validate(input)?;
        let updated = project.apply(patch, self.clock.utc());
        let stored = self
            .projects
            .update(&updated)
            .await
            .map_err(Self::map_persistence_error)?;
        if !stored {
            return Err(Self::project_not_found(id));
        }
        Ok(updated)
    }

    async fn delete(&self, actor: &Actor, id: &ProjectId) -> Result<(), Error> {
        self.load_for_mutation(actor, id, Mutation::Delete)
            .await?;
        let deleted = self
            .projects
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)?;
        if !deleted {
            return Err(Self::project_not_found(id));
        }
        info!(project_id = %id, "project deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
