//! Token service port.

use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::errors::AppResult;

/// Bearer token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id as a string
    pub sub: String,
    /// Issued-at, epoch seconds
    pub iat: i64,
    /// Expiry, epoch seconds
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Bearer-token issuance and decoding.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenService: Send + Sync {
    /// Issue an access token whose `sub` is `subject`
    fn create_access_token(&self, subject: &str) -> AppResult<String>;

    /// Decode and verify a token.
    ///
    /// # Errors
    /// `ACCESS_TOKEN_EXPIRED` when the signature is valid but `exp` has passed,
    /// `ACCESS_TOKEN_INVALID` for anything else.
    fn decode_access_token(&self, token: &str) -> AppResult<TokenClaims>;
}
