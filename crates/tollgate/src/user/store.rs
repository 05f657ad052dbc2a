//! Identity store abstraction.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{NewUser, User};

/// Identity store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Username uniqueness was violated.
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistent lookup and creation of identities.
///
/// Implementations must guarantee username uniqueness themselves; callers do
/// not pre-check availability.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Persist a new user.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
}
