//! OpenAPI schemas for response envelopes.
//!
//! [`DataEnvelope`](super::envelope::DataEnvelope) is generic and only
//! derives `Serialize`. These concrete wrappers mirror its shape for each
//! payload so the generated document names them explicitly.

use utoipa::ToSchema;

use crate::domain::User;

use super::projects::ProjectResponse;

/// `{"data": Project}`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProjectEnvelope {
    data: ProjectResponse,
}

/// `{"data": [Project]}`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProjectListEnvelope {
    data: Vec<ProjectResponse>,
}

/// `{"data": User}`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserEnvelope {
    data: User,
}
