//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::user::RegistrationError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Protected resource reached without a bound identity.
    #[error("authentication required")]
    Unauthenticated,

    /// Malformed token or signature mismatch.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token subject has no matching identity.
    #[error("user not found")]
    UserNotFound,

    /// Wrong username or password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Insufficient permissions.
    #[error("insufficient permissions: {0}")]
    InsufficientPermissions(String),

    /// Registration rejected.
    #[error("registration rejected: {0}")]
    Registration(#[from] RegistrationError),

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated
            | AuthError::InvalidToken(_)
            | AuthError::UserNotFound
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            AuthError::Registration(_) => StatusCode::BAD_REQUEST,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::UserNotFound | AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InsufficientPermissions(_) => "INSUFFICIENT_PERMISSIONS",
            AuthError::Registration(_) => "INVALID_REGISTRATION",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to clients.
    pub(crate) fn public_message(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "authentication required",
            AuthError::InvalidToken(_) => "invalid token",
            AuthError::UserNotFound | AuthError::InvalidCredentials => "invalid credentials",
            AuthError::InsufficientPermissions(_) => "insufficient permissions",
            AuthError::Registration(_) => "invalid registration request",
            AuthError::Internal(_) => "internal error",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Internal(msg) => error!(message = %msg, "Auth internal error"),
            AuthError::Registration(cause) => warn!(cause = %cause, "Registration rejected"),
            _ => {}
        }

        let body = Json(AuthErrorResponse {
            error: self.public_message().to_string(),
            code: self.error_code(),
        });

        (self.status_code(), body).into_response()
    }
}
