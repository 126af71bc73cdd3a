//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
pub mod metrics;
mod state_builders;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::error::extractor_config;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::projects::{
    create_project, delete_project, get_project, list_projects, patch_project, update_project,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{
    current_user, delete_user, login, logout, register, update_user,
};
use crate::middleware::{RateLimit, RateLimiter, Trace};

/// Shared state handed to every worker's [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppDependencies {
    /// Build ports and the rate limiter described by `config`.
    pub fn from_config(config: &ServerConfig, health_state: web::Data<HealthState>) -> Self {
        Self {
            health_state,
            http_state: build_http_state(config),
            rate_limiter: Arc::new(RateLimiter::per_minute(config.rate_limit_per_minute)),
        }
    }
}

/// Assemble the application: `/api/v1` routes, health probes and, in debug
/// builds, Swagger UI at `/docs`.
///
/// Only the `/api/v1/projects` scope is rate limited; the limiter itself
/// ignores non-read methods.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        rate_limiter,
    } = deps;
    let (json_config, path_config, query_config) = extractor_config();

    let projects = web::scope("/projects")
        .wrap(RateLimit::new(rate_limiter))
        .service(list_projects)
        .service(create_project)
        .service(get_project)
        .service(update_project)
        .service(patch_project)
        .service(delete_project);

    let api = web::scope("/api/v1")
        .service(projects)
        .service(register)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(update_user)
        .service(delete_user);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config)
        .app_data(path_config)
        .app_data(query_config)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// Readiness is left to the caller, which marks it once startup work such
/// as migrations has finished.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let deps = AppDependencies::from_config(&config, health_state);
    let bind_addr = config.bind_addr();

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::new(config.prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(deps.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
