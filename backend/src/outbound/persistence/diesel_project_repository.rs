//! PostgreSQL-backed `ProjectRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProjectPersistenceError, ProjectRepository};
use crate::domain::{
    Project, ProjectDescription, ProjectId, ProjectLink, ProjectRecord, ProjectStatus,
    ProjectTitle, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewProjectRow, ProjectRow, ProjectUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::projects;

/// Diesel-backed implementation of the `ProjectRepository` port.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProjectPersistenceError {
    map_basic_pool_error(error, ProjectPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProjectPersistenceError {
    map_basic_diesel_error(
        error,
        ProjectPersistenceError::query,
        ProjectPersistenceError::connection,
    )
}

fn corrupt(field: &str, id: uuid::Uuid, err: impl std::fmt::Display) -> ProjectPersistenceError {
    ProjectPersistenceError::query(format!("project {id} has invalid {field}: {err}"))
}

fn optional_link(
    field: &str,
    id: uuid::Uuid,
    value: Option<String>,
) -> Result<Option<ProjectLink>, ProjectPersistenceError> {
    value
        .map(|raw| ProjectLink::new(raw).map_err(|err| corrupt(field, id, err)))
        .transpose()
}

/// Rehydrate a row, rejecting values the domain would never have written.
fn row_to_project(row: ProjectRow) -> Result<Project, ProjectPersistenceError> {
    let id = row.id;
    let record = ProjectRecord {
        id: ProjectId::from_uuid(id),
        title: ProjectTitle::new(row.title).map_err(|err| corrupt("title", id, err))?,
        description: row
            .description
            .map(|raw| ProjectDescription::new(raw).map_err(|err| corrupt("description", id, err)))
            .transpose()?,
        demo_link: optional_link("demo_link", id, row.demo_link)?,
        github_link: optional_link("github_link", id, row.github_link)?,
        image: optional_link("image", id, row.image)?,
        status: row
            .status
            .parse::<ProjectStatus>()
            .map_err(|err| corrupt("status", id, err))?,
        owner: UserId::from_uuid(row.user_id),
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(record.into())
}

fn link_str(link: Option<&ProjectLink>) -> Option<&str> {
    link.map(AsRef::as_ref)
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = projects::table
            .select(ProjectRow::as_select())
            .order((projects::created_at.desc(), projects::id.asc()))
            .into_boxed();
        if let Some(owner) = owner {
            query = query.filter(projects::user_id.eq(*owner.as_uuid()));
        }

        let rows: Vec<ProjectRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_project).collect()
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProjectRow> = projects::table
            .filter(projects::id.eq(id.as_uuid()))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_project).transpose()
    }

    async fn insert(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewProjectRow {
            id: *project.id().as_uuid(),
            title: project.title().as_ref(),
            description: project.description().map(AsRef::as_ref),
            demo_link: link_str(project.demo_link()),
            github_link: link_str(project.github_link()),
            image: link_str(project.image()),
            status: project.status().as_str(),
            user_id: *project.owner().as_uuid(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        };

        diesel::insert_into(projects::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, project: &Project) -> Result<bool, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = ProjectUpdate {
            title: project.title().as_ref(),
            description: project.description().map(AsRef::as_ref),
            demo_link: link_str(project.demo_link()),
            github_link: link_str(project.github_link()),
            image: link_str(project.image()),
            status: project.status().as_str(),
            updated_at: project.updated_at(),
        };

        let target = projects::table.filter(projects::id.eq(project.id().as_uuid()));
        let affected = diesel::update(target)
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(projects::table.filter(projects::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(status: &str, demo_link: Option<&str>) -> ProjectRow {
        let now = Utc::now();
        ProjectRow {
            id: Uuid::new_v4(),
            title: "Demo".to_owned(),
            description: None,
            demo_link: demo_link.map(str::to_owned),
            github_link: None,
            image: None,
            status: status.to_owned(),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn valid_rows_rehydrate() {
        let source = row("finished", Some("https://example.com"));
        let owner = source.user_id;
        let project = row_to_project(source).expect("valid row");
        assert_eq!(project.status(), ProjectStatus::Finished);
        assert_eq!(project.owner().as_uuid(), &owner);
        assert_eq!(
            project.demo_link().map(AsRef::as_ref),
            Some("https://example.com")
        );
    }

    #[rstest]
    #[case(row("archived", None))]
    #[case(row("planned", Some("not a url")))]
    fn corrupt_rows_are_query_errors(#[case] source: ProjectRow) {
        let err = row_to_project(source).expect_err("corrupt row");
        assert!(matches!(err, ProjectPersistenceError::Query { .. }));
    }
}
