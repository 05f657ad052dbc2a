//! Bearer-token authentication stage.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION, request::Parts};
use chrono::Utc;
use log::{debug, error, warn};

use super::{
    AuthError, CurrentUser, IdentityResolver, SecurityContext, SecurityStage, TokenCodec,
    TokenValidator,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-sensitively with exactly one space.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
}

/// Binds the token's identity into the security context.
///
/// Any failure leaves the context unauthenticated. Rejection is left to
/// the routes that require a principal.
#[derive(Clone)]
pub struct Authenticator {
    codec: Arc<TokenCodec>,
    validator: TokenValidator,
    resolver: Arc<dyn IdentityResolver>,
}

impl Authenticator {
    pub fn new(codec: Arc<TokenCodec>, resolver: Arc<dyn IdentityResolver>) -> Self {
        Self {
            validator: TokenValidator::new(codec.clone()),
            codec,
            resolver,
        }
    }

    pub async fn authenticate(&self, headers: &HeaderMap, mut ctx: SecurityContext) -> SecurityContext {
        let Some(token) = bearer_token(headers) else {
            return ctx;
        };

        let claims = match self.codec.decode_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Ignoring bearer token: {}", e);
                return ctx;
            }
        };

        if ctx.is_authenticated() {
            return ctx;
        }

        let subject = &claims.sub;
        let user = match self.resolver.resolve(subject).await {
            Ok(user) => user,
            Err(AuthError::UserNotFound) => {
                warn!("Token subject has no identity: {}", subject);
                return ctx;
            }
            Err(e) => {
                error!("Identity lookup failed for {}: {}", subject, e);
                return ctx;
            }
        };

        if self.validator.check_claims(&claims, &user, Utc::now()) {
            debug!("Authenticated {}", user.username);
            ctx.bind(CurrentUser::from_identity(&user));
        } else {
            debug!("Token expired or not issued to {}", subject);
        }

        ctx
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SecurityStage for Authenticator {
    async fn apply(&self, parts: &Parts, ctx: SecurityContext) -> SecurityContext {
        self.authenticate(&parts.headers, ctx).await
    }
}
