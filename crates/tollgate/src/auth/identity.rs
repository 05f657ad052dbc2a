//! Identity capabilities consumed by the auth core.

use async_trait::async_trait;

use super::AuthError;
use crate::user::User;

/// Something that can be authenticated.
pub trait Authenticatable {
    fn username(&self) -> &str;

    /// Granted authority names, e.g. `"USER"`.
    fn authorities(&self) -> Vec<String>;

    fn is_active(&self) -> bool;
}

/// Maps a token subject to a full identity.
///
/// Returns [`AuthError::UserNotFound`] for unknown subjects.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, subject: &str) -> Result<User, AuthError>;
}
