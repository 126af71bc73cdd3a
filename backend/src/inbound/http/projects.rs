//! Project API handlers.
//!
//! ```text
//! GET    /api/v1/projects[?scope=mine]
//! GET    /api/v1/projects/{id}
//! POST   /api/v1/projects          {"name":"Demo","status":"planned"}
//! PUT    /api/v1/projects/{id}     {"status":"current"}
//! PATCH  /api/v1/projects/{id}     {"demo_link":null}
//! DELETE /api/v1/projects/{id}
//! ```
//!
//! Payloads accept `name` or `title` for the project title. Responses
//! render it under the key chosen by [`TitleKey`].

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ProjectScope;
use crate::domain::{
    Error, FieldErrors, Patch, Project, ProjectId, ProjectInput, ProjectStatus, UserId,
};

use super::ApiResult;
use super::auth::ActorContext;
use super::envelope::{DataEnvelope, MessageResponse};
use super::state::HttpState;

/// JSON key(s) under which project titles are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitleKey {
    /// `name`, the key long-standing clients read.
    #[default]
    Name,
    /// `title`, the canonical field name.
    Title,
    /// Both keys with the same value.
    Both,
}

impl TitleKey {
    const fn writes_name(self) -> bool {
        matches!(self, Self::Name | Self::Both)
    }

    const fn writes_title(self) -> bool {
        matches!(self, Self::Title | Self::Both)
    }
}

/// Returned when a configured title key is not `name`, `title` or `both`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown project title key '{0}'")]
pub struct UnknownTitleKey(String);

impl FromStr for TitleKey {
    type Err = UnknownTitleKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "title" => Ok(Self::Title),
            "both" => Ok(Self::Both),
            _ => Err(UnknownTitleKey(s.to_owned())),
        }
    }
}

/// Distinguish an absent key from an explicit `null`.
fn present<'de, D>(deserializer: D) -> Result<Patch<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(Patch::from)
}

/// Create and update payload.
///
/// Every field is optional at the wire level; the domain decides what is
/// required. `user_id` and unknown keys are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProjectRequest {
    /// Alias of `title`.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "Demo")]
    pub name: Patch<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "Demo")]
    pub title: Patch<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Patch<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "https://demo.example.com")]
    pub demo_link: Patch<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "https://github.com/ada/demo")]
    pub github_link: Patch<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub image: Patch<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<ProjectStatus>, example = "planned")]
    pub status: Patch<Value>,
}

impl ProjectRequest {
    /// Resolve aliases and JSON types into raw domain input.
    pub fn into_input(self) -> ProjectInput {
        let mut rejected = FieldErrors::new();
        let title = resolve_title(&mut rejected, self.name, self.title);
        let description = string_field(&mut rejected, "description", self.description);
        let demo_link = string_field(&mut rejected, "demo_link", self.demo_link);
        let github_link = string_field(&mut rejected, "github_link", self.github_link);
        let image = string_field(&mut rejected, "image", self.image);
        let status = string_field(&mut rejected, "status", self.status);
        ProjectInput {
            title,
            description,
            demo_link,
            github_link,
            image,
            status,
            rejected,
        }
    }
}

fn string_field(rejected: &mut FieldErrors, field: &str, value: Patch<Value>) -> Patch<String> {
    match value {
        Patch::Missing => Patch::Missing,
        Patch::Null => Patch::Null,
        Patch::Value(Value::String(text)) => Patch::Value(text),
        Patch::Value(_) => {
            rejected.push(
                field,
                format!("the {} must be a string", field.replace('_', " ")),
            );
            Patch::Missing
        }
    }
}

fn resolve_title(
    rejected: &mut FieldErrors,
    name: Patch<Value>,
    title: Patch<Value>,
) -> Patch<String> {
    let name = string_field(rejected, "title", name);
    let title = string_field(rejected, "title", title);
    match (name, title) {
        (Patch::Missing, only) | (only, Patch::Missing) => only,
        (name, title) if name == title => title,
        _ => {
            rejected.push("title", "the name and title fields must match");
            Patch::Missing
        }
    }
}

/// Project as rendered to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: ProjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Demo")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Demo")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub demo_link: Option<String>,
    pub github_link: Option<String>,
    pub image: Option<String>,
    pub status: ProjectStatus,
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectResponse {
    /// Render `project` with its title under `key`.
    pub fn render(project: &Project, key: TitleKey) -> Self {
        let title = project.title().as_ref().to_owned();
        Self {
            id: *project.id(),
            name: key.writes_name().then(|| title.clone()),
            title: key.writes_title().then_some(title),
            description: owned(project.description()),
            demo_link: owned(project.demo_link()),
            github_link: owned(project.github_link()),
            image: owned(project.image()),
            status: project.status(),
            user_id: *project.owner(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        }
    }
}

fn owned<T: AsRef<str>>(value: Option<&T>) -> Option<String> {
    value.map(|inner| inner.as_ref().to_owned())
}

/// Query string for `GET /projects`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProjectsQuery {
    /// `mine` restricts the listing to the caller's projects.
    #[param(value_type = Option<String>, example = "mine")]
    pub scope: Option<ScopeParam>,
}

/// Wire spelling of [`ProjectScope`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeParam {
    #[default]
    All,
    Mine,
}

impl From<ScopeParam> for ProjectScope {
    fn from(value: ScopeParam) -> Self {
        match value {
            ScopeParam::All => Self::All,
            ScopeParam::Mine => Self::Mine,
        }
    }
}

/// Ids that are not UUIDs cannot name a stored project.
fn parse_project_id(raw: &str) -> Result<ProjectId, Error> {
    ProjectId::new(raw).map_err(|_| Error::not_found("project not found"))
}

/// Mutations answer `401` before looking at the id.
fn mutation_target(context: &ActorContext, raw: &str) -> Result<ProjectId, Error> {
    context.actor().require_user()?;
    parse_project_id(raw)
}

/// Body extraction deferred until the caller is known, so anonymous
/// mutations answer `401` whatever they send.
type DeferredBody = Result<web::Json<ProjectRequest>, actix_web::Error>;

fn decode_body(payload: DeferredBody) -> Result<ProjectInput, Error> {
    match payload {
        Ok(body) => Ok(body.into_inner().into_input()),
        Err(err) => Err(err
            .as_error::<Error>()
            .cloned()
            .unwrap_or_else(|| Error::invalid_request("request body is not valid JSON"))),
    }
}

fn render_one(state: &HttpState, project: &Project) -> DataEnvelope<ProjectResponse> {
    DataEnvelope::new(ProjectResponse::render(project, state.title_key))
}

/// List projects, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(ListProjectsQuery),
    responses(
        (status = 200, description = "Projects", body = super::schemas::ProjectListEnvelope),
        (status = 400, description = "Invalid query string", body = Error),
        (status = 401, description = "`scope=mine` without a valid token", body = Error),
        (status = 429, description = "Rate limit exceeded", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "listProjects",
    security([])
)]
#[get("")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    context: ActorContext,
    query: web::Query<ListProjectsQuery>,
) -> ApiResult<HttpResponse> {
    let scope = query.scope.unwrap_or_default().into();
    let projects = state.projects.list(context.actor(), scope).await?;
    let data: Vec<ProjectResponse> = projects
        .iter()
        .map(|project| ProjectResponse::render(project, state.title_key))
        .collect();
    Ok(HttpResponse::Ok().json(DataEnvelope::new(data)))
}

/// Fetch one project.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = super::schemas::ProjectEnvelope),
        (status = 404, description = "Not found", body = Error),
        (status = 429, description = "Rate limit exceeded", body = Error)
    ),
    tags = ["projects"],
    operation_id = "getProject",
    security([])
)]
#[get("/{id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    context: ActorContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_project_id(&path)?;
    let project = state.projects.get(context.actor(), &id).await?;
    Ok(HttpResponse::Ok().json(render_one(&state, &project)))
}

/// Create a project owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Created", body = super::schemas::ProjectEnvelope),
        (status = 400, description = "Malformed body", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 422, description = "Validation failed", body = Error)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("")]
pub async fn create_project(
    state: web::Data<HttpState>,
    context: ActorContext,
    payload: DeferredBody,
) -> ApiResult<HttpResponse> {
    context.actor().require_user()?;
    let input = decode_body(payload)?;
    let project = state
        .projects_command
        .create(context.actor(), input)
        .await?;
    Ok(HttpResponse::Created().json(render_one(&state, &project)))
}

async fn apply_update(
    state: web::Data<HttpState>,
    context: ActorContext,
    path: web::Path<String>,
    payload: DeferredBody,
) -> ApiResult<HttpResponse> {
    let id = mutation_target(&context, &path)?;
    let input = decode_body(payload)?;
    let project = state
        .projects_command
        .update(context.actor(), &id, input)
        .await?;
    Ok(HttpResponse::Ok().json(render_one(&state, &project)))
}

/// Update a project the caller owns. Only supplied fields change.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Updated", body = super::schemas::ProjectEnvelope),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 422, description = "Validation failed", body = Error)
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[put("/{id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    context: ActorContext,
    path: web::Path<String>,
    payload: DeferredBody,
) -> ApiResult<HttpResponse> {
    apply_update(state, context, path, payload).await
}

/// Same as `PUT`.
#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Updated", body = super::schemas::ProjectEnvelope),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 422, description = "Validation failed", body = Error)
    ),
    tags = ["projects"],
    operation_id = "patchProject"
)]
#[patch("/{id}")]
pub async fn patch_project(
    state: web::Data<HttpState>,
    context: ActorContext,
    path: web::Path<String>,
    payload: DeferredBody,
) -> ApiResult<HttpResponse> {
    apply_update(state, context, path, payload).await
}

/// Delete a project the caller owns.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/{id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    context: ActorContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = mutation_target(&context, &path)?;
    state.projects_command.delete(context.actor(), &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Project deleted successfully")))
}
