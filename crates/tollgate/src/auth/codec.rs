//! Token codec: claims in, signed compact JWT out, and back.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use log::debug;
use serde_json::{Map, Value};

use super::{AuthError, Claims, KeyProvider};

/// Issues and verifies HS256 tokens.
///
/// Decoding checks the signature and structure only. Freshness is a
/// separate question answered by [`super::TokenValidator`].
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: KeyProvider,
    ttl: Duration,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(keys: KeyProvider, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            keys,
            ttl,
            validation,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` valid from now for the configured TTL.
    pub fn issue(&self, subject: &str, extra: Map<String, Value>) -> Result<String, AuthError> {
        self.issue_at(subject, extra, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        extra: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims::new(subject, now, self.ttl, extra);
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            self.keys.key().encoding(),
        )
        .map_err(|e| AuthError::Internal(format!("signing token: {e}")))
    }

    /// Verify the signature and parse the claims. Does not check expiration.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, self.keys.key().decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("JWT decode failed: {:?}", e.kind());
                AuthError::InvalidToken(e.to_string())
            })
    }

    pub fn subject_of(&self, token: &str) -> Result<String, AuthError> {
        Ok(self.decode_claims(token)?.sub)
    }

    pub fn expiration_of(&self, token: &str) -> Result<DateTime<Utc>, AuthError> {
        self.decode_claims(token)?
            .expires_at()
            .ok_or_else(|| AuthError::InvalidToken("expiration out of range".to_string()))
    }
}
