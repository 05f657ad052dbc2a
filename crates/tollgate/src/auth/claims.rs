//! JWT claims.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim names owned by the token itself; never taken from extra claims.
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,

    /// Issued at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds).
    pub exp: i64,

    /// Additional application claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Build claims for `subject` issued at `issued_at` and valid for `ttl`.
    pub fn new(
        subject: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        mut extra: Map<String, Value>,
    ) -> Self {
        for name in RESERVED_CLAIMS {
            extra.remove(name);
        }

        let iat = issued_at.timestamp();
        Self {
            sub: subject.into(),
            iat,
            exp: iat + ttl.num_seconds(),
            extra,
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token has expired at `now`. A token expiring exactly now is expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}
