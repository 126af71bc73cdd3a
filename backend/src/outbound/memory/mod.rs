//! In-process store implementing every repository port.
//!
//! Used when no `DATABASE_URL` is configured and by the HTTP integration
//! tests. One lock guards all three tables so the cascade on user deletion
//! is atomic, matching the `ON DELETE CASCADE` foreign keys in PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{
    AccessTokenPersistenceError, AccessTokenRepository, IssuedToken, ProjectPersistenceError,
    ProjectRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{EmailAddress, Project, ProjectId, TokenDigest, User, UserAccount, UserId};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, UserAccount>,
    projects: HashMap<ProjectId, Project>,
    tokens: HashMap<TokenDigest, IssuedToken>,
}

impl Tables {
    fn email_taken_by_other(&self, email: &EmailAddress, id: &UserId) -> bool {
        self.users
            .values()
            .any(|account| account.user.email() == email && account.user.id() != id)
    }
}

/// Thread-safe in-memory repositories.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, ProjectPersistenceError> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|project| owner.is_none_or(|owner| project.owner() == &owner))
            .cloned()
            .collect();
        projects.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(projects)
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectPersistenceError> {
        Ok(self.tables.read().await.projects.get(id).cloned())
    }

    async fn insert(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(project.owner()) {
            return Err(ProjectPersistenceError::query(format!(
                "owner {} does not exist",
                project.owner()
            )));
        }
        tables.projects.insert(*project.id(), project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<bool, ProjectPersistenceError> {
        let mut tables = self.tables.write().await;
        match tables.projects.get_mut(project.id()) {
            Some(slot) => {
                *slot = project.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool, ProjectPersistenceError> {
        Ok(self.tables.write().await.projects.remove(id).is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken_by_other(account.user.email(), account.user.id()) {
            return Err(UserPersistenceError::duplicate_email());
        }
        tables.users.insert(*account.user.id(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .get(id)
            .map(|account| account.user.clone()))
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|account| account.user.email().as_ref() == email)
            .cloned())
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .any(|account| account.user.email() == email))
    }

    async fn update_profile(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken_by_other(user.email(), user.id()) {
            return Err(UserPersistenceError::duplicate_email());
        }
        match tables.users.get_mut(user.id()) {
            Some(account) => {
                account.user = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(id).is_none() {
            return Ok(false);
        }
        tables.projects.retain(|_, project| project.owner() != id);
        tables.tokens.retain(|_, token| &token.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl AccessTokenRepository for MemoryStore {
    async fn issue(
        &self,
        digest: &TokenDigest,
        user_id: &UserId,
        issued_at: DateTime<Utc>,
    ) -> Result<(), AccessTokenPersistenceError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(user_id) {
            return Err(AccessTokenPersistenceError::query(format!(
                "user {user_id} does not exist"
            )));
        }
        tables.tokens.insert(
            digest.clone(),
            IssuedToken {
                user_id: *user_id,
                created_at: issued_at,
            },
        );
        Ok(())
    }

    async fn resolve(
        &self,
        digest: &TokenDigest,
        _used_at: DateTime<Utc>,
    ) -> Result<Option<IssuedToken>, AccessTokenPersistenceError> {
        Ok(self.tables.read().await.tokens.get(digest).cloned())
    }

    async fn revoke(&self, digest: &TokenDigest) -> Result<bool, AccessTokenPersistenceError> {
        Ok(self.tables.write().await.tokens.remove(digest).is_some())
    }
}
