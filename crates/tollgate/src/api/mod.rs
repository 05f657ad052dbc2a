//! HTTP API module.
//!
//! Public login/registration endpoints and the token-protected `/api/v1` tree.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::{AuthResponse, HealthResponse};
pub use routes::create_router;
pub use state::AppState;
