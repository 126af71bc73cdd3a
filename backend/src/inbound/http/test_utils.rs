//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use crate::domain::ports::{
    MockLoginService, MockProjectsCommand, MockProjectsQuery, MockUserAccountsCommand,
    MockUserProfileQuery,
};
use crate::domain::{IdentityService, ProjectService};
use crate::outbound::crypto::Argon2PasswordHasher;
use crate::outbound::memory::MemoryStore;

use super::projects::TitleKey;
use super::state::{HttpState, HttpStatePorts};

/// State whose only live port is `login`; every other port panics if called.
pub fn state_with_login(login: MockLoginService) -> HttpState {
    HttpState::new(HttpStatePorts {
        login: Arc::new(login),
        accounts: Arc::new(MockUserAccountsCommand::new()),
        profile: Arc::new(MockUserProfileQuery::new()),
        projects: Arc::new(MockProjectsQuery::new()),
        projects_command: Arc::new(MockProjectsCommand::new()),
    })
}

/// State backed by real services over a fresh [`MemoryStore`].
pub fn memory_state(title_key: TitleKey) -> web::Data<HttpState> {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(IdentityService::new(
        store.clone(),
        store.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(DefaultClock),
    ));
    let projects = Arc::new(ProjectService::new(store, Arc::new(DefaultClock)));
    web::Data::new(HttpState::with_title_key(
        HttpStatePorts {
            login: identity.clone(),
            accounts: identity.clone(),
            profile: identity,
            projects: projects.clone(),
            projects_command: projects,
        },
        title_key,
    ))
}
