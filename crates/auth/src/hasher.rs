//! Password hashing capability.
//!
//! The gate only depends on [`CredentialHasher`]; the algorithm behind it can be
//! swapped without touching login/registration logic.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

impl From<password_hash::Error> for HashError {
    fn from(value: password_hash::Error) -> Self {
        Self(value.to_string())
    }
}

impl From<argon2::Error> for HashError {
    fn from(value: argon2::Error) -> Self {
        Self(value.to_string())
    }
}

/// One-way salted hash + verification.
pub trait CredentialHasher: Send + Sync {
    /// Hash a cleartext password into a self-describing encoded string.
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Check a cleartext password against an encoded hash.
    ///
    /// Malformed hashes verify as `false`. Comparison of the derived digest
    /// must not short-circuit on the first differing byte.
    fn verify(&self, password: &str, encoded: &str) -> bool;
}

/// Argon2id hasher producing PHC strings (`$argon2id$v=19$...`).
///
/// Verification reads the parameters embedded in the stored hash, so hashes
/// produced with older cost settings keep verifying after a cost change. The
/// digest comparison inside `verify_password` is constant-time.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Recommended defaults (19 MiB, 2 iterations, 1 lane).
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Custom cost. Low settings are only appropriate for tests.
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, HashError> {
        let salt_bytes: [u8; 16] = rand::thread_rng().r#gen();
        let salt = SaltString::encode_b64(&salt_bytes)?;
        let hash = self.argon2().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, encoded: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
