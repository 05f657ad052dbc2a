//! Signing key provider.

use std::sync::Arc;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jsonwebtoken::{DecodingKey, EncodingKey};

use super::config::{AuthConfig, ConfigValidationError, MIN_SECRET_BYTES};

/// Standard alphabet, padding optional.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// HMAC-SHA256 key material in both directions.
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    len: usize,
}

impl SigningKey {
    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Process-wide signing key, immutable once built.
#[derive(Debug, Clone)]
pub struct KeyProvider {
    key: Arc<SigningKey>,
}

impl KeyProvider {
    /// Decode a base64 secret. Fails if it is malformed or shorter than
    /// [`MIN_SECRET_BYTES`] once decoded.
    pub fn from_base64_secret(secret: &str) -> Result<Self, ConfigValidationError> {
        let bytes = SECRET_ENGINE
            .decode(secret.trim())
            .map_err(|e| ConfigValidationError::InvalidJwtSecretEncoding(e.to_string()))?;

        if bytes.len() < MIN_SECRET_BYTES {
            return Err(ConfigValidationError::JwtSecretTooShort {
                actual: bytes.len(),
                minimum: MIN_SECRET_BYTES,
            });
        }

        Ok(Self {
            key: Arc::new(SigningKey {
                encoding: EncodingKey::from_secret(&bytes),
                decoding: DecodingKey::from_secret(&bytes),
                len: bytes.len(),
            }),
        })
    }

    /// Resolve and decode the secret from configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigValidationError> {
        let secret = config.require_jwt_secret()?;
        Self::from_base64_secret(&secret)
    }

    pub fn key(&self) -> &SigningKey {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

    #[test]
    fn test_accepts_256_bit_secret() {
        let secret = STANDARD.encode([7u8; 32]);
        let provider = KeyProvider::from_base64_secret(&secret).unwrap();
        assert_eq!(provider.key().len(), 32);
    }

    #[test]
    fn test_accepts_unpadded_and_surrounding_whitespace() {
        let secret = format!("  {}\n", STANDARD_NO_PAD.encode([1u8; 40]));
        let provider = KeyProvider::from_base64_secret(&secret).unwrap();
        assert_eq!(provider.key().len(), 40);
    }

    #[test]
    fn test_rejects_short_secret() {
        let secret = STANDARD.encode([7u8; 31]);
        assert_eq!(
            KeyProvider::from_base64_secret(&secret).unwrap_err(),
            ConfigValidationError::JwtSecretTooShort {
                actual: 31,
                minimum: 32
            }
        );
    }

    #[test]
    fn test_rejects_malformed_base64() {
        let err = KeyProvider::from_base64_secret("not base64 at all!!").unwrap_err();
        assert!(matches!(err, ConfigValidationError::InvalidJwtSecretEncoding(_)));
    }

    #[test]
    fn test_from_config_requires_secret() {
        let err = KeyProvider::from_config(&AuthConfig::default()).unwrap_err();
        assert_eq!(err, ConfigValidationError::MissingJwtSecret);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let provider = KeyProvider::from_base64_secret(&STANDARD.encode([0xAB; 32])).unwrap();
        let debug = format!("{provider:?}");
        assert!(debug.contains("len: 32"));
        assert!(!debug.contains("171"));
    }
}
