//! JWT implementation of the token port (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};

use crate::config::{Config, MAX_ACCESS_TOKEN_EXPIRE_MINUTES};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::ports::{TokenClaims, TokenService};

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    ttl: Duration,
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("keys", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtTokenService {
    /// `ttl_minutes` is clamped to +/- [`MAX_ACCESS_TOKEN_EXPIRE_MINUTES`].
    pub fn new(secret: &[u8], ttl_minutes: i64, issuer: Option<String>) -> Self {
        let ttl_minutes =
            ttl_minutes.clamp(-MAX_ACCESS_TOKEN_EXPIRE_MINUTES, MAX_ACCESS_TOKEN_EXPIRE_MINUTES);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret_bytes(),
            config.access_token_expire_minutes,
            config.jwt_issuer.clone(),
        )
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

impl TokenService for JwtTokenService {
    fn create_access_token(&self, subject: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal("Failed to sign access token").caused_by(e))
    }

    fn decode_access_token(&self, token: &str) -> AppResult<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| {
                let code = match e.kind() {
                    JwtErrorKind::ExpiredSignature => ErrorCode::AccessTokenExpired,
                    _ => ErrorCode::AccessTokenInvalid,
                };
                AppError::new(code).caused_by(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-for-testing-only-32chars";

    fn service() -> JwtTokenService {
        JwtTokenService::new(SECRET, 30, None)
    }

    #[test]
    fn test_round_trip_keeps_subject() {
        let svc = service();
        let token = svc.create_access_token("2f1c7c1e-0000-4000-8000-000000000001").unwrap();
        let claims = svc.decode_access_token(&token).unwrap();

        assert_eq!(claims.sub, "2f1c7c1e-0000-4000-8000-000000000001");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert!(claims.iss.is_none());
    }

    #[test]
    fn test_out_of_range_lifetime_is_clamped() {
        let svc = JwtTokenService::new(SECRET, i64::MAX, None);
        let token = svc.create_access_token("user").unwrap();
        let claims = svc.decode_access_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, MAX_ACCESS_TOKEN_EXPIRE_MINUTES * 60);
    }

    #[test]
    fn test_expired_token_is_distinguishable() {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "user".into(),
            iat: now - 7200,
            exp: now - 3600,
            iss: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let err = service().decode_access_token(&token).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AccessTokenExpired);
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let other = JwtTokenService::new(b"another-secret-key-with-32-characters!", 30, None);
        let token = other.create_access_token("user").unwrap();

        let err = service().decode_access_token(&token).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AccessTokenInvalid);

        let err = service().decode_access_token("garbage").unwrap_err();
        assert_eq!(err.code(), ErrorCode::AccessTokenInvalid);
    }

    #[test]
    fn test_issuer_is_embedded_and_checked() {
        let issuing = JwtTokenService::new(SECRET, 30, Some("bookstore".into()));
        let token = issuing.create_access_token("user").unwrap();
        assert_eq!(
            issuing.decode_access_token(&token).unwrap().iss.as_deref(),
            Some("bookstore")
        );

        let strict = JwtTokenService::new(SECRET, 30, Some("someone-else".into()));
        let err = strict.decode_access_token(&token).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AccessTokenInvalid);
    }
}
