//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, ProjectsCommand, ProjectsQuery, UserAccountsCommand, UserProfileQuery,
};

use super::projects::TitleKey;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccountsCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub projects: Arc<dyn ProjectsQuery>,
    pub projects_command: Arc<dyn ProjectsCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccountsCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub projects: Arc<dyn ProjectsQuery>,
    pub projects_command: Arc<dyn ProjectsCommand>,
    /// Key under which project titles are rendered.
    pub title_key: TitleKey,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state rendering project titles under the default key.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use portfolio_backend::domain::{IdentityService, ProjectService};
    /// use portfolio_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use portfolio_backend::outbound::crypto::Argon2PasswordHasher;
    /// use portfolio_backend::outbound::memory::MemoryStore;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let identity = Arc::new(IdentityService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     Arc::new(Argon2PasswordHasher::new()),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let projects = Arc::new(ProjectService::new(store, Arc::new(DefaultClock)));
    /// let state = HttpState::new(HttpStatePorts {
    ///     login: identity.clone(),
    ///     accounts: identity.clone(),
    ///     profile: identity,
    ///     projects: projects.clone(),
    ///     projects_command: projects,
    /// });
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_title_key(ports, TitleKey::default())
    }

    /// Construct state with an explicit output key for project titles.
    pub fn with_title_key(ports: HttpStatePorts, title_key: TitleKey) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            profile,
            projects,
            projects_command,
        } = ports;
        Self {
            login,
            accounts,
            profile,
            projects,
            projects_command,
            title_key,
        }
    }
}
