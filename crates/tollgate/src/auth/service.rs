//! Login and registration, each ending in a freshly issued token.

use std::sync::Arc;

use serde_json::Map;
use tracing::{info, instrument};

use super::{AuthError, TokenCodec};
use crate::user::{Credentials, RegistrationRequest, UserService};

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(users: UserService, codec: Arc<TokenCodec>) -> Self {
        Self { users, codec }
    }

    /// Check credentials and issue a token for the user.
    ///
    /// Every failure to authenticate is reported as
    /// [`AuthError::InvalidCredentials`].
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        let user = self
            .users
            .verify_credentials(credentials)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.codec.issue(&user.username, Map::new())?;
        info!("Issued token on login");
        Ok(token)
    }

    /// Register a user and issue a token for them.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegistrationRequest) -> Result<String, AuthError> {
        let user = self.users.register(request).await?;
        self.codec.issue(&user.username, Map::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::KeyProvider;
    use crate::user::{BcryptHasher, IdentityStore, MemoryIdentityStore, RegistrationError, Role};
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use chrono::Duration;

    fn service() -> (AuthService, Arc<TokenCodec>, Arc<MemoryIdentityStore>) {
        let keys = KeyProvider::from_base64_secret(&STANDARD.encode([3u8; 32])).unwrap();
        let codec = Arc::new(TokenCodec::new(keys, Duration::hours(24)));
        let store = Arc::new(MemoryIdentityStore::new());
        let users = UserService::new(store.clone(), Arc::new(BcryptHasher::new(4)));
        (AuthService::new(users, codec.clone()), codec, store)
    }

    fn registration(username: &str, password: &str) -> RegistrationRequest {
        RegistrationRequest {
            username: username.to_string(),
            password: password.to_string(),
            firstname: "A".to_string(),
            lastname: "L".to_string(),
            country: "US".to_string(),
            role: None,
        }
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (auth, codec, _) = service();
        let token = auth.register(registration("alice", "pw123")).await.unwrap();
        assert_eq!(codec.subject_of(&token).unwrap(), "alice");

        let token = auth.login(&credentials("alice", "pw123")).await.unwrap();
        let claims = codec.decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (auth, _, store) = service();
        auth.register(registration("alice", "pw123")).await.unwrap();
        auth.register(registration("bob", "secret")).await.unwrap();
        store.set_active("bob", false);

        for (username, password) in [("alice", "wrong"), ("nobody", "pw123"), ("bob", "secret")] {
            let err = auth.login(&credentials(username, password)).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials), "{username}");
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let (auth, _, _) = service();
        auth.register(registration("alice", "pw123")).await.unwrap();
        let err = auth.register(registration("alice", "other")).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Registration(RegistrationError::UsernameTaken(_))
        ));
    }

    #[tokio::test]
    async fn test_registered_role_defaults_to_user() {
        let (auth, _, store) = service();
        auth.register(registration("alice", "pw123")).await.unwrap();
        let user = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.role, Role::User);
    }
}
