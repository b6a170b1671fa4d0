//! Secret hashing with Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Hash error: {0}")]
    HashError(String),
}

pub struct SecretHasher;

impl SecretHasher {
    /// Hash a raw credential secret for at-rest storage. A fresh salt is
    /// drawn per call, so two issuances of the same raw text never store
    /// identical values.
    pub fn hash(secret: &str) -> Result<String, SecretError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| SecretError::HashError(e.to_string()))
    }

    /// Verify a raw secret against a stored hash. A malformed stored hash
    /// verifies as false; validation stays a pure boolean path.
    pub fn verify(secret: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let stored = SecretHasher::hash("super-secret").unwrap();
        assert!(SecretHasher::verify("super-secret", &stored));
        assert!(!SecretHasher::verify("other-secret", &stored));
    }

    #[test]
    fn same_input_hashes_differently() {
        let h1 = SecretHasher::hash("repeated").unwrap();
        let h2 = SecretHasher::hash("repeated").unwrap();
        assert_ne!(h1, h2);
        assert!(SecretHasher::verify("repeated", &h1));
        assert!(SecretHasher::verify("repeated", &h2));
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        assert!(!SecretHasher::verify("anything", "not-a-phc-string"));
        assert!(!SecretHasher::verify("anything", ""));
    }
}
