//! Argon2 implementation of the password port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AppError, AppResult};
use crate::ports::PasswordService;

/// Password hashing with Argon2id and a random salt per hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordService;

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self
    }

    /// Get Argon2 instance with default config.
    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash_password(&self, raw: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, raw: &str, hashed: &str) -> bool {
        match PasswordHash::new(hashed) {
            Ok(parsed) => Self::argon2()
                .verify_password(raw.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::debug!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}
