//! Authorization gate for project operations.
//!
//! Every service call receives the [`Actor`] explicitly. Ownership decisions
//! for projects are made here and nowhere else.

use super::{Error, Project, UserId};

/// The identity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// No valid bearer token was presented.
    Anonymous,
    /// A resolved, authenticated user.
    User(UserId),
}

impl Actor {
    /// The authenticated user id, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(id),
        }
    }

    /// Require an authenticated user or fail with `401`.
    pub fn require_user(&self) -> Result<UserId, Error> {
        self.user_id()
            .copied()
            .ok_or_else(|| Error::unauthorized("unauthenticated"))
    }

    /// Accounts may only be managed by their owner: `401` when anonymous,
    /// `403` when acting on someone else.
    pub fn require_self(&self, target: &UserId) -> Result<UserId, Error> {
        let user = self.require_user()?;
        if &user != target {
            return Err(Error::forbidden("this action is unauthorized"));
        }
        Ok(user)
    }
}

impl From<Option<UserId>> for Actor {
    fn from(value: Option<UserId>) -> Self {
        value.map_or(Self::Anonymous, Self::User)
    }
}

/// Operation being attempted on the project collection or one project.
#[derive(Debug, Clone, Copy)]
pub enum ProjectOperation<'a> {
    Read,
    Create,
    Update(&'a Project),
    Delete(&'a Project),
}

/// Decide whether `actor` may perform `operation`.
///
/// # Examples
/// ```
/// use portfolio_backend::domain::{can, Actor, ProjectOperation, UserId};
///
/// assert!(can(&Actor::Anonymous, ProjectOperation::Read));
/// assert!(!can(&Actor::Anonymous, ProjectOperation::Create));
/// assert!(can(&Actor::User(UserId::random()), ProjectOperation::Create));
/// ```
#[must_use]
pub fn can(actor: &Actor, operation: ProjectOperation<'_>) -> bool {
    authorize(actor, operation).is_ok()
}

/// Like [`can`], but reports why access was refused.
///
/// Anonymous actors receive `401` for any mutation; identified actors who do
/// not own the target receive `403`.
pub fn authorize(actor: &Actor, operation: ProjectOperation<'_>) -> Result<(), Error> {
    match operation {
        ProjectOperation::Read => Ok(()),
        ProjectOperation::Create => actor.require_user().map(|_| ()),
        ProjectOperation::Update(project) | ProjectOperation::Delete(project) => {
            let user = actor.require_user()?;
            if project.owner() == &user {
                Ok(())
            } else {
                Err(Error::forbidden("this action is unauthorized"))
            }
        }
    }
}
