//! Per-request security context and the extractors that read it.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

use super::{AuthError, Authenticatable};
use crate::user::{Role, User};

/// Authenticated principal bound to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
    pub authorities: Vec<String>,
    pub firstname: String,
    pub lastname: String,
    pub country: String,
}

impl CurrentUser {
    pub fn from_identity(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            authorities: user.authorities(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            country: user.country.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

/// Request-scoped slot for the authenticated principal.
///
/// Starts empty and is bound at most once.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<CurrentUser>,
}

impl SecurityContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn principal(&self) -> Option<&CurrentUser> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Bind `principal` if the context is still empty. Returns whether it was bound.
    pub fn bind(&mut self, principal: CurrentUser) -> bool {
        if self.principal.is_some() {
            return false;
        }
        self.principal = Some(principal);
        true
    }
}

/// Extract the authenticated principal, rejecting unauthenticated requests.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::principal)
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Require admin role.
///
/// Use as an extractor in handlers that require admin access.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions(
                "admin role required".to_string(),
            ));
        }

        Ok(RequireAdmin(user))
    }
}
