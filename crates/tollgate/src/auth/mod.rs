//! Authentication module.
//!
//! Stateless bearer-token authentication:
//! - HS256 token issuing and verification
//! - a per-request security context populated by a stage pipeline
//! - extractors that reject requests without a bound principal

mod claims;
mod codec;
mod config;
mod context;
mod error;
mod identity;
mod keys;
mod middleware;
mod pipeline;
mod service;
mod validator;

pub use claims::{Claims, RESERVED_CLAIMS};
pub use codec::TokenCodec;
pub use config::{
    AuthConfig, ConfigValidationError, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS, MIN_SECRET_BYTES,
};
pub use context::{CurrentUser, RequireAdmin, SecurityContext};
pub use error::{AuthError, AuthErrorResponse};
pub use identity::{Authenticatable, IdentityResolver};
pub use keys::{KeyProvider, SigningKey};
pub use middleware::{Authenticator, bearer_token};
pub use pipeline::{SecurityPipeline, SecurityStage, require_authenticated, security_context_middleware};
pub use service::AuthService;
pub use validator::TokenValidator;
