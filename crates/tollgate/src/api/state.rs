//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{AuthService, SecurityPipeline};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Login and registration.
    pub auth: AuthService,
    /// Stages run before routing to populate the security context.
    pub pipeline: SecurityPipeline,
    /// Allowed CORS origins.
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(auth: AuthService, pipeline: SecurityPipeline, allowed_origins: Vec<String>) -> Self {
        Self {
            auth,
            pipeline,
            allowed_origins: Arc::new(allowed_origins),
        }
    }
}
