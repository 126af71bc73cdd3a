//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler and the health probes, the
//! response envelopes from [`crate::inbound::http::schemas`], and a Bearer
//! security scheme applied by default. Public routes opt out with
//! `security([])` on their path attribute.
//!
//! The document is served by Swagger UI in debug builds and printed by
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, ProjectStatus, User};
use crate::inbound::http::envelope::MessageResponse;
use crate::inbound::http::projects::{ProjectRequest, ProjectResponse};
use crate::inbound::http::schemas::{ProjectEnvelope, ProjectListEnvelope, UserEnvelope};
use crate::inbound::http::users::{
    LoginRequest, RegisterRequest, TokenResponse, UpdateUserRequest,
};

/// Name of the security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Opaque token issued by POST /api/v1/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Portfolio backend API",
        description = "Project portfolio CRUD with bearer-token accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::patch_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        ProjectStatus,
        ProjectRequest,
        ProjectResponse,
        ProjectEnvelope,
        ProjectListEnvelope,
        UserEnvelope,
        MessageResponse,
        RegisterRequest,
        LoginRequest,
        TokenResponse,
        UpdateUserRequest,
    )),
    tags(
        (name = "projects", description = "Portfolio projects"),
        (name = "users", description = "Accounts and bearer tokens"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn document() -> Value {
        serde_json::to_value(ApiDoc::openapi()).expect("document serialises")
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = document();
        let scheme = &doc["components"]["securitySchemes"][BEARER_SCHEME];
        assert_eq!(scheme["type"], "http");
        assert_eq!(scheme["scheme"], "bearer");
    }

    #[rstest]
    #[case("/api/v1/projects", "get")]
    #[case("/api/v1/projects/{id}", "get")]
    #[case("/api/v1/register", "post")]
    #[case("/api/v1/login", "post")]
    #[case("/health/ready", "get")]
    fn public_operations_opt_out_of_security(#[case] path: &str, #[case] method: &str) {
        let doc = document();
        let operation = &doc["paths"][path][method];
        assert!(operation.is_object(), "missing {method} {path}");
        let security = operation.get("security").expect("operation-level security");
        assert!(!security.to_string().contains(BEARER_SCHEME), "{security}");
    }

    #[rstest]
    #[case("/api/v1/projects", "post")]
    #[case("/api/v1/projects/{id}", "put")]
    #[case("/api/v1/projects/{id}", "patch")]
    #[case("/api/v1/projects/{id}", "delete")]
    #[case("/api/v1/logout", "post")]
    #[case("/api/v1/user", "get")]
    #[case("/api/v1/users/{id}", "put")]
    #[case("/api/v1/users/{id}", "delete")]
    fn protected_operations_inherit_bearer_security(#[case] path: &str, #[case] method: &str) {
        let doc = document();
        let operation = &doc["paths"][path][method];
        assert!(operation.is_object(), "missing {method} {path}");
        assert!(operation.get("security").is_none());
        assert_eq!(doc["security"], serde_json::json!([{ "BearerToken": [] }]));
    }

    #[rstest]
    #[case("Error", &["message", "code"])]
    #[case("User", &["id", "name", "email"])]
    #[case("ProjectResponse", &["id", "status", "user_id", "created_at"])]
    fn schemas_expose_their_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = document();
        let properties = &doc["components"]["schemas"][name]["properties"];
        for field in fields {
            assert!(properties.get(field).is_some(), "{name} lacks {field}");
        }
    }
}
