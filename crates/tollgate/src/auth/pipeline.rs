//! Security pipeline: ordered stages that populate the request's
//! [`SecurityContext`] before routing.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use super::{AuthError, SecurityContext};

/// One step of the security chain.
///
/// Stages receive the request parts and the context so far, and return the
/// context to hand to the next stage. They never reject a request.
#[async_trait]
pub trait SecurityStage: Send + Sync {
    async fn apply(&self, parts: &Parts, ctx: SecurityContext) -> SecurityContext;
}

/// Ordered list of security stages.
#[derive(Clone, Default)]
pub struct SecurityPipeline {
    stages: Vec<Arc<dyn SecurityStage>>,
}

impl SecurityPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage. Stages run in insertion order.
    pub fn with_stage(mut self, stage: impl SecurityStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub async fn run(&self, parts: &Parts, mut ctx: SecurityContext) -> SecurityContext {
        for stage in &self.stages {
            ctx = stage.apply(parts, ctx).await;
        }
        ctx
    }
}

impl std::fmt::Debug for SecurityPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityPipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

/// Run the pipeline and store the resulting [`SecurityContext`] in the
/// request extensions. Always forwards to the next handler.
///
/// An existing context extension is reused, so running this layer twice
/// never replaces a principal that is already bound.
pub async fn security_context_middleware(
    State(pipeline): State<SecurityPipeline>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();

    let ctx = parts
        .extensions
        .remove::<SecurityContext>()
        .unwrap_or_default();
    let ctx = pipeline.run(&parts, ctx).await;
    parts.extensions.insert(ctx);

    next.run(Request::from_parts(parts, body)).await
}

/// Route layer for protected routes: 401 unless a principal is bound.
pub async fn require_authenticated(
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let authenticated = req
        .extensions()
        .get::<SecurityContext>()
        .is_some_and(SecurityContext::is_authenticated);

    if !authenticated {
        return Err(AuthError::Unauthenticated);
    }

    Ok(next.run(req).await)
}
