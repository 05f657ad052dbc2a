//! Token validity against a known identity.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{AuthError, Authenticatable, Claims, TokenCodec};

/// Decides whether a token belongs to an identity and is still fresh.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    codec: Arc<TokenCodec>,
}

impl TokenValidator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// `Ok(true)` iff the subject is `identity`'s username and the token has
    /// not expired. Mismatch and expiry are `Ok(false)`; only tokens that fail
    /// to decode are errors.
    pub fn is_valid<I>(&self, token: &str, identity: &I) -> Result<bool, AuthError>
    where
        I: Authenticatable + ?Sized,
    {
        self.is_valid_at(token, identity, Utc::now())
    }

    pub fn is_valid_at<I>(
        &self,
        token: &str,
        identity: &I,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthError>
    where
        I: Authenticatable + ?Sized,
    {
        let claims = self.codec.decode_claims(token)?;
        Ok(self.check_claims(&claims, identity, now))
    }

    /// Same check on claims that were already decoded and verified.
    pub fn check_claims<I>(&self, claims: &Claims, identity: &I, now: DateTime<Utc>) -> bool
    where
        I: Authenticatable + ?Sized,
    {
        claims.sub == identity.username() && !claims.is_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::KeyProvider;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use chrono::Duration;
    use serde_json::Map;

    struct Named(&'static str);

    impl Authenticatable for Named {
        fn username(&self) -> &str {
            self.0
        }

        fn authorities(&self) -> Vec<String> {
            vec!["USER".to_string()]
        }

        fn is_active(&self) -> bool {
            true
        }
    }

    fn validator(ttl: Duration) -> (TokenValidator, Arc<TokenCodec>) {
        let keys = KeyProvider::from_base64_secret(&STANDARD.encode([9u8; 32])).unwrap();
        let codec = Arc::new(TokenCodec::new(keys, ttl));
        (TokenValidator::new(codec.clone()), codec)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_valid_for_matching_subject() {
        let (validator, codec) = validator(Duration::hours(1));
        let token = codec.issue("alice", Map::new()).unwrap();
        assert!(validator.is_valid(&token, &Named("alice")).unwrap());
    }

    #[test]
    fn test_subject_mismatch_is_false() {
        let (validator, codec) = validator(Duration::hours(1));
        let token = codec.issue("alice", Map::new()).unwrap();
        assert!(!validator.is_valid(&token, &Named("bob")).unwrap());
        assert!(!validator.is_valid(&token, &Named("Alice")).unwrap());
    }

    #[test]
    fn test_expiry_boundary() {
        let (validator, codec) = validator(Duration::seconds(60));
        let token = codec.issue_at("alice", Map::new(), at(1_000)).unwrap();
        let identity = Named("alice");

        assert!(validator.is_valid_at(&token, &identity, at(1_059)).unwrap());
        assert!(!validator.is_valid_at(&token, &identity, at(1_060)).unwrap());
        assert!(!validator.is_valid_at(&token, &identity, at(5_000)).unwrap());
    }

    #[test]
    fn test_check_claims_matches_is_valid_at() {
        let (validator, codec) = validator(Duration::seconds(60));
        let token = codec.issue_at("alice", Map::new(), at(1_000)).unwrap();
        let claims = codec.decode_claims(&token).unwrap();

        for (identity, now) in [("alice", 1_059), ("alice", 1_060), ("bob", 1_010)] {
            assert_eq!(
                validator.check_claims(&claims, &Named(identity), at(now)),
                validator.is_valid_at(&token, &Named(identity), at(now)).unwrap(),
                "{identity} at {now}"
            );
        }
        assert!(validator.check_claims(&claims, &Named("alice"), at(1_059)));
        assert!(!validator.check_claims(&claims, &Named("alice"), at(1_060)));
    }

    #[test]
    fn test_expired_token_with_real_clock() {
        let (validator, codec) = validator(Duration::seconds(30));
        let token = codec
            .issue_at("alice", Map::new(), Utc::now() - Duration::minutes(5))
            .unwrap();
        assert!(!validator.is_valid(&token, &Named("alice")).unwrap());
    }

    #[test]
    fn test_malformed_token_is_error() {
        let (validator, _) = validator(Duration::hours(1));
        assert!(matches!(
            validator.is_valid("garbage", &Named("alice")),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
