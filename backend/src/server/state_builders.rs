//! Builders wiring repositories into the HTTP state.
//!
//! With a database pool every port is backed by Diesel repositories;
//! without one, a single [`MemoryStore`] backs all of them.

use std::sync::Arc;

use actix_web::web;
use chrono::Duration;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{AccessTokenRepository, ProjectRepository, UserRepository};
use crate::domain::{IdentityService, ProjectService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::crypto::Argon2PasswordHasher;
use crate::outbound::memory::MemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselAccessTokenRepository, DieselProjectRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Repositories behind the domain services.
struct Repositories<U, T, P> {
    users: Arc<U>,
    tokens: Arc<T>,
    projects: Arc<P>,
}

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<DieselUserRepository, DieselAccessTokenRepository, DieselProjectRepository> {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        tokens: Arc::new(DieselAccessTokenRepository::new(pool.clone())),
        projects: Arc::new(DieselProjectRepository::new(pool.clone())),
    }
}

fn memory_repositories() -> Repositories<MemoryStore, MemoryStore, MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    Repositories {
        users: store.clone(),
        tokens: store.clone(),
        projects: store,
    }
}

/// Build the driving ports over one set of repositories.
fn build_ports<U, T, P>(
    repositories: Repositories<U, T, P>,
    token_ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    T: AccessTokenRepository + 'static,
    P: ProjectRepository + 'static,
{
    let Repositories {
        users,
        tokens,
        projects,
    } = repositories;
    let identity = Arc::new(
        IdentityService::new(
            users,
            tokens,
            Arc::new(Argon2PasswordHasher::new()),
            clock.clone(),
        )
        .with_token_ttl(token_ttl),
    );
    let projects = Arc::new(ProjectService::new(projects, clock));
    HttpStatePorts {
        login: identity.clone(),
        accounts: identity.clone(),
        profile: identity,
        projects: projects.clone(),
        projects_command: projects,
    }
}

/// Build the shared HTTP state for `config`.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ports = match &config.db_pool {
        Some(pool) => build_ports(diesel_repositories(pool), config.access_token_ttl, clock),
        None => build_ports(memory_repositories(), config.access_token_ttl, clock),
    };
    web::Data::new(HttpState::with_title_key(ports, config.title_key))
}
