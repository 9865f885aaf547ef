//! Password hashing and verification with Argon2id.
//!
//! Hashes are stored in PHC string format, so parameters travel with the hash
//! and can be strengthened later without invalidating existing accounts.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Tunable Argon2 cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        // OWASP-recommended baseline for Argon2id
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Params {
    /// Deliberately weak parameters so test suites that hash many passwords
    /// stay fast. Never use outside tests.
    pub fn insecure_for_tests() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Hash a password with the default cost parameters.
pub fn hash_string(password: &str) -> Result<String> {
    hash_string_with_params(password, Argon2Params::default())
}

/// Hash a password with explicit cost parameters.
pub fn hash_string_with_params(password: &str, params: Argon2Params) -> Result<String> {
    let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
        .map_err(|e| anyhow!("invalid argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash itself is
/// malformed.
pub fn verify_string(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| anyhow!("malformed password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_string_with_params("s3cret", Argon2Params::insecure_for_tests()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_string("s3cret", &hash).unwrap());
        assert!(!verify_string("wrong", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let params = Argon2Params::insecure_for_tests();
        let a = hash_string_with_params("s3cret", params).unwrap();
        let b = hash_string_with_params("s3cret", params).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_string("anything", "not-a-phc-string").is_err());
    }
}
