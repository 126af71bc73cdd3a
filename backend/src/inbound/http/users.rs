//! Account and session handlers.
//!
//! ```text
//! POST   /api/v1/register   {"name","email","password","password_confirmation"}
//! POST   /api/v1/login      {"email":"ada@example.com","password":"..."}
//! POST   /api/v1/logout
//! GET    /api/v1/user
//! PUT    /api/v1/users/{id} {"name":"Ada King"}
//! DELETE /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{
    Error, FieldErrors, LoginCredentials, LoginValidationError, ProfileChanges,
    RegistrationInput, UserId,
};

use super::ApiResult;
use super::auth::ActorContext;
use super::envelope::{DataEnvelope, MessageResponse};
use super::state::HttpState;

/// Registration body for `POST /api/v1/register`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    pub password: Option<Zeroizing<String>>,
    #[schema(value_type = Option<String>, format = Password)]
    pub password_confirmation: Option<Zeroizing<String>>,
}

impl From<RegisterRequest> for RegistrationInput {
    fn from(value: RegisterRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: value.password,
            password_confirmation: value.password_confirmation,
        }
    }
}

/// Login body for `POST /api/v1/login`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    pub password: Option<Zeroizing<String>>,
}

impl LoginRequest {
    /// Validate both fields, reporting every blank one.
    fn into_credentials(self) -> Result<LoginCredentials, Error> {
        let email = self.email.unwrap_or_default();
        let password = self.password.unwrap_or_default();
        match LoginCredentials::try_from_parts(&email, &password) {
            Ok(credentials) => Ok(credentials),
            Err(first) => {
                let mut errors = FieldErrors::new();
                push_login_error(&mut errors, &first);
                // The constructor stops at the first blank field.
                if first == LoginValidationError::EmptyEmail && password.is_empty() {
                    push_login_error(&mut errors, &LoginValidationError::EmptyPassword);
                }
                Err(errors.into_error())
            }
        }
    }
}

fn push_login_error(errors: &mut FieldErrors, error: &LoginValidationError) {
    let field = match error {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    errors.push(field, error.to_string());
}

/// Issued bearer token.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub token: String,
}

/// Profile changes for `PUT /api/v1/users/{id}`. Absent fields are kept.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "Ada King")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

/// Ids that are not UUIDs cannot name a stored user.
fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::not_found("user not found"))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = super::schemas::UserEnvelope),
        (status = 400, description = "Malformed body", body = Error),
        (status = 422, description = "Validation failed", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.accounts.register(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(DataEnvelope::new(user)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 422, description = "Missing fields", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = payload.into_inner().into_credentials()?;
    let token = state.login.login(&credentials).await?;
    Ok(HttpResponse::Ok().json(TokenResponse {
        token: token.expose().to_owned(),
    }))
}

/// Revoke the presented token.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    context: ActorContext,
) -> ApiResult<HttpResponse> {
    let token = context.require_token()?;
    state.login.logout(token).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out successfully")))
}

/// The authenticated user.
#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "Current user", body = super::schemas::UserEnvelope),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    context: ActorContext,
) -> ApiResult<HttpResponse> {
    let user = state.profile.current_user(context.actor()).await?;
    Ok(HttpResponse::Ok().json(DataEnvelope::new(user)))
}

/// Update the caller's own profile.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = super::schemas::UserEnvelope),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not this user", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 422, description = "Validation failed", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    context: ActorContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    context.actor().require_user()?;
    let target = parse_user_id(&path)?;
    context.actor().require_self(&target)?;
    let UpdateUserRequest { name, email } = payload.into_inner();
    let changes = ProfileChanges::validate(name, email)?;
    let user = state
        .accounts
        .update_profile(context.actor(), &target, changes)
        .await?;
    Ok(HttpResponse::Ok().json(DataEnvelope::new(user)))
}

/// Delete the caller's own account with its projects and tokens.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not this user", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    context: ActorContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    context.actor().require_user()?;
    let target = parse_user_id(&path)?;
    state
        .accounts
        .delete_account(context.actor(), &target)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}
