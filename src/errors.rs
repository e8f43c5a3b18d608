//! Centralized error handling.
//!
//! Every failure that crosses a layer boundary is an [`AppError`]: a single
//! error type tagged by a closed [`ErrorCode`]. Each code belongs to exactly one
//! [`ErrorKind`], and the kind (plus, for constraint violations, the
//! `violation` context entry) decides the [`ErrorSignal`] a transport sends.

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Boxed underlying cause kept for diagnostics.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Context key describing whether a constraint violation is a duplicate or a bad value.
pub const CONTEXT_VIOLATION: &str = "violation";
/// `violation` value for uniqueness failures.
pub const VIOLATION_DUPLICATE: &str = "duplicate";
/// `violation` value for range/check failures.
pub const VIOLATION_INVALID_VALUE: &str = "invalid_value";

/// Error families. Orthogonal to the machine-readable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Auth,
    Internal,
}

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Not found
    NotFound,
    UserNotFound,
    BookNotFound,
    RoleNotFound,

    // Conflict
    Conflict,
    EmailAlreadyExists,
    ConstraintViolation,
    StaleUpdate,

    // Validation
    Validation,
    InvalidEmail,
    PasswordTooWeak,

    // Auth
    Auth,
    InvalidCredentials,
    Unauthorized,
    AccessTokenMissing,
    AccessTokenInvalid,
    AccessTokenExpired,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Family this code belongs to
    pub fn kind(self) -> ErrorKind {
        match self {
            ErrorCode::NotFound
            | ErrorCode::UserNotFound
            | ErrorCode::BookNotFound
            | ErrorCode::RoleNotFound => ErrorKind::NotFound,
            ErrorCode::Conflict
            | ErrorCode::EmailAlreadyExists
            | ErrorCode::ConstraintViolation
            | ErrorCode::StaleUpdate => ErrorKind::Conflict,
            ErrorCode::Validation | ErrorCode::InvalidEmail | ErrorCode::PasswordTooWeak => {
                ErrorKind::Validation
            }
            ErrorCode::Auth
            | ErrorCode::InvalidCredentials
            | ErrorCode::Unauthorized
            | ErrorCode::AccessTokenMissing
            | ErrorCode::AccessTokenInvalid
            | ErrorCode::AccessTokenExpired => ErrorKind::Auth,
            ErrorCode::Internal => ErrorKind::Internal,
        }
    }

    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::BookNotFound => "BOOK_NOT_FOUND",
            ErrorCode::RoleNotFound => "ROLE_NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            ErrorCode::ConstraintViolation => "CONSTRAINT_VIOLATION",
            ErrorCode::StaleUpdate => "STALE_UPDATE",
            ErrorCode::Validation => "VALIDATION_ERROR",
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::PasswordTooWeak => "PASSWORD_TOO_WEAK",
            ErrorCode::Auth => "AUTH_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::AccessTokenMissing => "ACCESS_TOKEN_MISSING",
            ErrorCode::AccessTokenInvalid => "ACCESS_TOKEN_INVALID",
            ErrorCode::AccessTokenExpired => "ACCESS_TOKEN_EXPIRED",
            ErrorCode::Internal => "INTERNAL_ERROR",
        }
    }

    /// Message used when the caller does not supply one
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::BookNotFound => "Book not found",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::Conflict => "Request conflicts with current state",
            ErrorCode::EmailAlreadyExists => "Email already exists",
            ErrorCode::ConstraintViolation => "Resource violates data constraints",
            ErrorCode::StaleUpdate => "Stale update",
            ErrorCode::Validation => "Validation error",
            ErrorCode::InvalidEmail => "Email format is invalid",
            ErrorCode::PasswordTooWeak => "Password does not meet strength requirements",
            ErrorCode::Auth => "Authentication/Authorization error",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::AccessTokenMissing => "Access token is missing",
            ErrorCode::AccessTokenInvalid => "Access token is invalid",
            ErrorCode::AccessTokenExpired => "Access token is expired",
            ErrorCode::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a transport should tell its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSignal {
    NotFound,
    Conflict,
    BadRequest,
    Unauthorized,
    Internal,
}

/// Application error: code, human message, key/value context and optional cause.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AppError {
    code: ErrorCode,
    message: String,
    context: BTreeMap<String, String>,
    #[source]
    source: Option<BoxError>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            context: BTreeMap::new(),
            source: None,
        }
    }

    /// Error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::new(code)
        }
    }

    /// Attach a context entry
    pub fn context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Attach the underlying cause
    pub fn caused_by(mut self, cause: impl Into<BoxError>) -> Self {
        self.source = Some(cause.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context_map(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    /// True for an optimistic-lock failure; the caller should re-read and retry.
    pub fn is_stale_update(&self) -> bool {
        self.code == ErrorCode::StaleUpdate
    }

    /// Transport signal per the error-to-transport table
    pub fn signal(&self) -> ErrorSignal {
        match self.code {
            ErrorCode::ConstraintViolation => {
                if self.context_value(CONTEXT_VIOLATION) == Some(VIOLATION_INVALID_VALUE) {
                    ErrorSignal::BadRequest
                } else {
                    ErrorSignal::Conflict
                }
            }
            _ => match self.kind() {
                ErrorKind::NotFound => ErrorSignal::NotFound,
                ErrorKind::Conflict => ErrorSignal::Conflict,
                ErrorKind::Validation => ErrorSignal::BadRequest,
                ErrorKind::Auth => ErrorSignal::Unauthorized,
                ErrorKind::Internal => ErrorSignal::Internal,
            },
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self.signal() {
            ErrorSignal::NotFound => StatusCode::NOT_FOUND,
            ErrorSignal::Conflict => StatusCode::CONFLICT,
            ErrorSignal::BadRequest => StatusCode::BAD_REQUEST,
            ErrorSignal::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorSignal::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => {
                tracing::error!(code = %self.code, cause = ?self.source, "Internal error: {}", self.message);
                "An internal error occurred".to_string()
            }
            _ => self.message.clone(),
        }
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(code: ErrorCode) -> Self {
        debug_assert_eq!(code.kind(), ErrorKind::NotFound);
        Self::new(code)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::Validation, msg)
    }

    /// Constraint violation that the caller caused by sending a bad value
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConstraintViolation, msg)
            .context(CONTEXT_VIOLATION, VIOLATION_INVALID_VALUE)
    }

    /// Constraint violation caused by an existing row
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConstraintViolation, msg)
            .context(CONTEXT_VIOLATION, VIOLATION_DUPLICATE)
    }

    pub fn stale_update(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StaleUpdate, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::Internal, msg)
    }
}

impl From<ErrorCode> for AppError {
    fn from(code: ErrorCode) -> Self {
        AppError::new(code)
    }
}

/// Untranslated storage failures (reads, connectivity) are internal.
/// Writes go through the repository's constraint translation instead.
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::internal("Database error").caused_by(err)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<BTreeMap<String, String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let context = match self.kind() {
            ErrorKind::Internal => None,
            _ if self.context.is_empty() => None,
            _ => Some(self.context.clone()),
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code.as_str(),
                message: self.user_message(),
                context,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_default_message_and_code() {
        let err = AppError::new(ErrorCode::BookNotFound).context("book_id", "42");

        assert_eq!(err.to_string(), "Book not found");
        assert_eq!(err.code().as_str(), "BOOK_NOT_FOUND");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.context_value("book_id"), Some("42"));
    }

    #[test]
    fn test_transport_signals() {
        let cases = [
            (AppError::new(ErrorCode::UserNotFound), ErrorSignal::NotFound),
            (AppError::new(ErrorCode::EmailAlreadyExists), ErrorSignal::Conflict),
            (AppError::duplicate("title/author must be unique"), ErrorSignal::Conflict),
            (AppError::invalid_value("price must be non-negative"), ErrorSignal::BadRequest),
            (AppError::stale_update("stale update"), ErrorSignal::Conflict),
            (AppError::new(ErrorCode::InvalidCredentials), ErrorSignal::Unauthorized),
            (AppError::new(ErrorCode::Unauthorized), ErrorSignal::Unauthorized),
            (AppError::validation("bad"), ErrorSignal::BadRequest),
            (AppError::new(ErrorCode::PasswordTooWeak), ErrorSignal::BadRequest),
            (AppError::internal("boom"), ErrorSignal::Internal),
        ];

        for (err, expected) in cases {
            assert_eq!(err.signal(), expected, "{}", err.code());
        }
    }

    #[test]
    fn test_constraint_violation_without_marker_is_conflict() {
        let err = AppError::new(ErrorCode::ConstraintViolation);
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_cause_is_exposed_as_source() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = AppError::internal("write failed").caused_by(cause);

        assert_eq!(err.source().map(|e| e.to_string()), Some("disk on fire".into()));
    }

    #[test]
    fn test_internal_message_hidden() {
        let err = AppError::internal("connection refused to 10.0.0.3");
        assert_eq!(err.user_message(), "An internal error occurred");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_stale_update_flag() {
        assert!(AppError::stale_update("stale update").is_stale_update());
        assert!(!AppError::duplicate("dup").is_stale_update());
        assert_eq!(AppError::stale_update("x").kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_response_body_shape() {
        let response = AppError::duplicate("title/author must be unique")
            .context("entity", "book")
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["code"], "CONSTRAINT_VIOLATION");
        assert_eq!(body["error"]["message"], "title/author must be unique");
        assert_eq!(body["error"]["context"]["entity"], "book");
        assert_eq!(body["error"]["context"]["violation"], "duplicate");
    }

    #[tokio::test]
    async fn test_internal_response_drops_context() {
        let response = AppError::internal("pool exhausted")
            .context("host", "10.0.0.3")
            .into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(body["error"].get("context").is_none());
    }
}
