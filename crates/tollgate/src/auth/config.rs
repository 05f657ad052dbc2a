//! Authentication configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Minimum HMAC-SHA256 key size in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Default token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60 * 24;

/// Longest accepted token lifetime: 365 days.
pub const MAX_TOKEN_TTL_SECS: i64 = DEFAULT_TOKEN_TTL_SECS * 365;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base64-encoded HS256 signing secret, or `env:VAR_NAME`.
    /// Must decode to at least 32 bytes.
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,

    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,

    /// Allowed CORS origins. Empty disables cross-origin access.
    pub allowed_origins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // No default secret - must be explicitly configured
            jwt_secret: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            allowed_origins: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Resolved secret, failing if none is configured.
    pub fn require_jwt_secret(&self) -> Result<String, ConfigValidationError> {
        self.resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)
    }

    /// Token lifetime, clamped to [`MAX_TOKEN_TTL_SECS`]. Call [`Self::validate`]
    /// first to reject out-of-range values instead.
    pub fn token_ttl(&self) -> Duration {
        Duration::try_seconds(self.token_ttl_secs.min(MAX_TOKEN_TTL_SECS))
            .unwrap_or_else(|| Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    /// Validate everything except the key material, which
    /// [`super::KeyProvider::from_config`] checks when it decodes it.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.token_ttl_secs <= 0 {
            return Err(ConfigValidationError::NonPositiveTokenTtl(self.token_ttl_secs));
        }
        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigValidationError::TokenTtlTooLong {
                actual: self.token_ttl_secs,
                maximum: MAX_TOKEN_TTL_SECS,
            });
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigValidationError::BcryptCostOutOfRange(self.bcrypt_cost));
        }
        Ok(())
    }

    /// Generate a random base64 secret suitable for `jwt_secret`.
    pub fn generate_jwt_secret() -> String {
        use base64::Engine as _;
        use rand::RngCore;

        let mut bytes = [0u8; 48];
        rand::rng().fill_bytes(&mut bytes);
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }
}

/// Configuration validation errors. All of them are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// No JWT secret configured.
    MissingJwtSecret,
    /// JWT secret is not valid base64.
    InvalidJwtSecretEncoding(String),
    /// Decoded JWT secret is shorter than the HS256 minimum.
    JwtSecretTooShort { actual: usize, minimum: usize },
    /// Token lifetime must be positive.
    NonPositiveTokenTtl(i64),
    /// Token lifetime above [`MAX_TOKEN_TTL_SECS`].
    TokenTtlTooLong { actual: i64, maximum: i64 },
    /// bcrypt cost outside 4..=31.
    BcryptCostOutOfRange(u32),
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    EnvVarEmpty(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingJwtSecret => {
                write!(
                    f,
                    "JWT secret is required. Set TOLLGATE_AUTH__JWT_SECRET or auth.jwt_secret in config (run `tollgate init` to generate one)."
                )
            }
            Self::InvalidJwtSecretEncoding(reason) => {
                write!(f, "JWT secret is not valid base64: {}", reason)
            }
            Self::JwtSecretTooShort { actual, minimum } => {
                write!(
                    f,
                    "JWT secret decodes to {} bytes; HS256 needs at least {} bytes.",
                    actual, minimum
                )
            }
            Self::NonPositiveTokenTtl(ttl) => {
                write!(f, "token_ttl_secs must be positive, got {}.", ttl)
            }
            Self::TokenTtlTooLong { actual, maximum } => {
                write!(
                    f,
                    "token_ttl_secs must be at most {} (365 days), got {}.",
                    maximum, actual
                )
            }
            Self::BcryptCostOutOfRange(cost) => {
                write!(f, "bcrypt_cost must be between 4 and 31, got {}.", cost)
            }
            Self::EnvVarNotFound(var) => {
                write!(
                    f,
                    "Environment variable '{}' not found (referenced via env:{} in config).",
                    var, var
                )
            }
            Self::EnvVarEmpty(var) => {
                write!(
                    f,
                    "Environment variable '{}' is empty (referenced via env:{} in config).",
                    var, var
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}
