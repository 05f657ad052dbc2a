//! User service for registration and credential checks.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::models::{Credentials, NewUser, RegistrationRequest, Role, User};
use super::password::PasswordHasher;
use super::store::{IdentityStore, StoreError};
use crate::auth::{AuthError, IdentityResolver};

const MAX_USERNAME_LEN: usize = 50;
/// bcrypt ignores everything past 72 bytes.
const MAX_PASSWORD_BYTES: usize = 72;
/// Hashed once per service and checked against when there is no usable stored hash.
const DUMMY_PASSWORD: &str = "tollgate-dummy-password";

/// Registration failures.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid username: {0}")]
    InvalidUsername(&'static str),

    #[error("invalid password: {0}")]
    InvalidPassword(&'static str),

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken(name) => RegistrationError::UsernameTaken(name),
            other => RegistrationError::Store(other),
        }
    }
}

/// Service for user management operations.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn IdentityStore>,
    hasher: Arc<dyn PasswordHasher>,
    dummy_hash: Arc<OnceLock<Option<String>>>,
}

impl UserService {
    /// Create a new user service.
    pub fn new(store: Arc<dyn IdentityStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            hasher,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Validate, hash and persist a new user.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegistrationRequest) -> Result<User, RegistrationError> {
        validate_username(&request.username)?;
        validate_password(&request.password)?;

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(|e| RegistrationError::Hashing(format!("{e:#}")))?;

        let user = self
            .store
            .insert(NewUser {
                username: request.username,
                password_hash,
                firstname: request.firstname,
                lastname: request.lastname,
                country: request.country,
                role: request.role.unwrap_or(Role::User),
            })
            .await?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "Registered user");
        Ok(user)
    }

    /// Get a user by username.
    #[instrument(skip(self))]
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.store.find_by_username(username).await
    }

    /// Verify login credentials.
    ///
    /// Unknown users, inactive users and wrong passwords all yield `Ok(None)`,
    /// and each of them costs exactly one password verification.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn verify_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<User>, StoreError> {
        let user = self.store.find_by_username(&credentials.username).await?;

        match user {
            Some(user) if user.is_active => {
                if self.hasher.verify(&credentials.password, &user.password_hash) {
                    return Ok(Some(user));
                }
                debug!("Password mismatch");
                Ok(None)
            }
            Some(_) => {
                warn!("Login attempt for inactive user");
                self.verify_dummy(&credentials.password);
                Ok(None)
            }
            None => {
                debug!("Login attempt for unknown user");
                self.verify_dummy(&credentials.password);
                Ok(None)
            }
        }
    }

    fn verify_dummy(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_init(|| match self.hasher.hash(DUMMY_PASSWORD) {
                Ok(hash) => Some(hash),
                Err(e) => {
                    warn!(error = %e, "Failed to prepare dummy password hash");
                    None
                }
            });
        if let Some(hash) = dummy {
            let _ = self.hasher.verify(password, hash);
        }
    }
}

#[async_trait]
impl IdentityResolver for UserService {
    async fn resolve(&self, subject: &str) -> Result<User, AuthError> {
        self.store
            .find_by_username(subject)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UserNotFound)
    }
}

fn validate_username(username: &str) -> Result<(), RegistrationError> {
    if username.is_empty() {
        return Err(RegistrationError::InvalidUsername("must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(RegistrationError::InvalidUsername("must be at most 50 characters"));
    }
    if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(RegistrationError::InvalidUsername(
            "must not contain whitespace or control characters",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), RegistrationError> {
    if password.is_empty() {
        return Err(RegistrationError::InvalidPassword("must not be empty"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(RegistrationError::InvalidPassword("must be at most 72 bytes"));
    }
    Ok(())
}
