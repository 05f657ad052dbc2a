//! API request handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::Uri,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::auth::{AuthError, CurrentUser, RequireAdmin};
use crate::user::{Credentials, RegistrationRequest};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Login request.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration request. Always creates a regular user.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub country: String,
}

/// Token returned by login and registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Unwrap a JSON body, answering any rejection with `public` instead of
/// axum's plain-text description of it.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>, public: ApiError) -> ApiResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            debug!(
                status = %rejection.status(),
                detail = %rejection.body_text(),
                "Rejected request body"
            );
            Err(public)
        }
    }
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let request = json_body(payload, AuthError::InvalidCredentials.into())?;
    let credentials = Credentials {
        username: request.username,
        password: request.password,
    };
    let token = state.auth.login(&credentials).await?;
    Ok(Json(AuthResponse { token }))
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let request = json_body(payload, ApiError::bad_request("invalid registration request"))?;
    let token = state
        .auth
        .register(RegistrationRequest {
            username: request.username,
            password: request.password,
            firstname: request.firstname,
            lastname: request.lastname,
            country: request.country,
            role: None,
        })
        .await?;
    Ok(Json(AuthResponse { token }))
}

/// Protected demo endpoint.
pub async fn demo() -> &'static str {
    "Welcome for security endpoint"
}

/// The principal bound to this request.
pub async fn me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

/// Admin greeting.
#[derive(Debug, Serialize)]
pub struct AdminDemoResponse {
    pub message: String,
    pub username: String,
}

pub async fn admin_demo(RequireAdmin(user): RequireAdmin) -> Json<AdminDemoResponse> {
    Json(AdminDemoResponse {
        message: "Welcome, administrator".to_string(),
        username: user.username,
    })
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("no route for {}", uri.path()))
}
