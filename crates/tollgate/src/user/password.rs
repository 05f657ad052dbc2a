//! Password hashing.

use anyhow::{Context, Result};

/// One-way password hashing and verification.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String>;

    /// Returns false for a mismatch or an unparsable hash.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// bcrypt password hasher.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        bcrypt::hash(plaintext, self.cost).context("hashing password")
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_plaintext() {
        let hasher = BcryptHasher::new(4);
        let hash = hasher.hash("pw123").unwrap();
        assert_ne!(hash, "pw123");
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify() {
        let hasher = BcryptHasher::new(4);
        let hash = hasher.hash("correct").unwrap();
        assert!(hasher.verify("correct", &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn test_verify_garbage_hash_is_false() {
        let hasher = BcryptHasher::new(4);
        assert!(!hasher.verify("anything", "not-a-bcrypt-hash"));
    }
}
