//! Test utilities and common setup.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tower::ServiceExt;

use tollgate::api;
use tollgate::auth::{AuthConfig, AuthService, Authenticator, KeyProvider, SecurityPipeline, TokenCodec};
use tollgate::db::Database;
use tollgate::user::{BcryptHasher, RegistrationRequest, Role, UserRepository, UserService};

/// A router plus handles to the pieces behind it.
pub struct TestApp {
    pub router: Router,
    pub codec: Arc<TokenCodec>,
    pub users: UserService,
}

/// Create a test AuthConfig with a fixed signing secret.
fn test_auth_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.jwt_secret = Some(STANDARD.encode(b"integration-test-signing-key-0123456789"));
    config.bcrypt_cost = 4;
    config
}

/// Create a test application over an in-memory database.
pub async fn test_app() -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let auth_config = test_auth_config();

    let keys = KeyProvider::from_config(&auth_config).unwrap();
    let codec = Arc::new(TokenCodec::new(keys, auth_config.token_ttl()));

    let users = UserService::new(
        Arc::new(UserRepository::new(db.pool().clone())),
        Arc::new(BcryptHasher::new(auth_config.bcrypt_cost)),
    );

    let pipeline =
        SecurityPipeline::new().with_stage(Authenticator::new(codec.clone(), Arc::new(users.clone())));
    let auth = AuthService::new(users.clone(), codec.clone());
    let state = api::AppState::new(auth, pipeline, auth_config.allowed_origins.clone());

    TestApp {
        router: api::create_router(state),
        codec,
        users,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
    }

    /// POST a raw body, optionally with a `Content-Type` header.
    pub async fn post_raw(&self, uri: &str, content_type: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder().uri(uri).method(Method::POST);
        if let Some(value) = content_type {
            builder = builder.header(header::CONTENT_TYPE, value);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    /// Request `uri` with an optional `Authorization` header value.
    pub async fn call(&self, method: Method, uri: &str, authorization: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Create a user directly in the store, bypassing HTTP registration.
    pub async fn create_user(&self, username: &str, password: &str, role: Role) {
        self.users
            .register(RegistrationRequest {
                username: username.to_string(),
                password: password.to_string(),
                firstname: String::new(),
                lastname: String::new(),
                country: String::new(),
                role: Some(role),
            })
            .await
            .unwrap();
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
