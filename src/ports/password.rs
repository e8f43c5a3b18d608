//! Password service port.

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::errors::AppResult;

/// Credential hashing and verification.
///
/// Implementations never return or log the plain text.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait PasswordService: Send + Sync {
    /// Hash a raw password into an opaque, self-describing string
    fn hash_password(&self, raw: &str) -> AppResult<String>;

    /// Check a raw password against a stored hash.
    ///
    /// A malformed hash verifies as `false`.
    fn verify_password(&self, raw: &str, hashed: &str) -> bool;
}
