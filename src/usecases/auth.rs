//! Authentication use cases: register, login and bearer-token authentication.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use super::check_password_strength;
use crate::config::{BEARER_TOKEN_PREFIX, DUMMY_PASSWORD_HASH};
use crate::domain::user::{check_age, check_name};
use crate::domain::{is_valid_email, normalize_email, User};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::ports::{PasswordService, TokenService, UserRepository};

/// Access token for `user`; its subject is the user id.
fn issue_token(tokens: &dyn TokenService, user: &User) -> AppResult<String> {
    let id = user
        .id
        .ok_or_else(|| AppError::internal("Persisted user has no identity"))?;
    tokens.create_access_token(&id.to_string())
}

#[derive(Clone, Deserialize)]
pub struct RegisterUserCommand {
    pub email: String,
    pub name: String,
    pub age: i32,
    pub password: String,
}

impl fmt::Debug for RegisterUserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserCommand")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("age", &self.age)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of a registration
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub user: User,
    /// Present when the use case is configured to issue tokens on register
    pub access_token: Option<String>,
}

pub struct RegisterUserUseCase {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
    issue_token: bool,
}

impl RegisterUserUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        issue_token: bool,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
            issue_token,
        }
    }

    /// Create an account.
    ///
    /// # Errors
    /// - `INVALID_EMAIL`, `VALIDATION_ERROR` or `PASSWORD_TOO_WEAK` for bad input
    /// - `EMAIL_ALREADY_EXISTS` when the normalized email is taken
    pub async fn execute(&self, cmd: RegisterUserCommand) -> AppResult<RegisteredUser> {
        let email = normalize_email(&cmd.email);
        if !is_valid_email(&email) {
            return Err(AppError::new(ErrorCode::InvalidEmail).context("email", &email));
        }
        let name = cmd.name.trim().to_string();
        check_name(&name)?;
        check_age(cmd.age)?;
        check_password_strength(&cmd.password)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AppError::new(ErrorCode::EmailAlreadyExists).context("email", &email));
        }

        let hashed = self.passwords.hash_password(&cmd.password)?;
        let user = self
            .users
            .create(User::new(email, name, cmd.age, hashed))
            .await?;

        let access_token = if self.issue_token {
            Some(issue_token(self.tokens.as_ref(), &user)?)
        } else {
            None
        };

        Ok(RegisteredUser { user, access_token })
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub access_token: String,
}

pub struct LoginUserUseCase {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl LoginUserUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    /// Exchange credentials for an access token.
    ///
    /// Unknown email and wrong password fail identically with
    /// `INVALID_CREDENTIALS`, and no token is issued.
    pub async fn execute(&self, cmd: LoginCommand) -> AppResult<LoginResult> {
        let email = normalize_email(&cmd.email);
        let user = self.users.get_by_email(&email).await?;

        // Verify even for unknown emails so both failures cost the same
        let stored_hash = user
            .as_ref()
            .map(|u| u.hashed_password.as_str())
            .unwrap_or(DUMMY_PASSWORD_HASH);
        let password_ok = self.passwords.verify_password(&cmd.password, stored_hash);

        match user {
            Some(user) if password_ok => {
                let access_token = issue_token(self.tokens.as_ref(), &user)?;
                tracing::info!(user_id = ?user.id, "User logged in");
                Ok(LoginResult { user, access_token })
            }
            _ => {
                tracing::warn!("Login rejected: invalid credentials");
                Err(AppError::new(ErrorCode::InvalidCredentials))
            }
        }
    }
}

/// Resolve a bearer token to the user it was issued for.
pub struct AuthenticateUseCase {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
}

impl AuthenticateUseCase {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Accepts the raw token or an `Authorization` header value.
    ///
    /// # Errors
    /// - `ACCESS_TOKEN_MISSING` for an empty value
    /// - `ACCESS_TOKEN_EXPIRED` / `ACCESS_TOKEN_INVALID` from the token port
    /// - `UNAUTHORIZED` when the user no longer exists
    pub async fn execute(&self, token: &str) -> AppResult<User> {
        let token = token.strip_prefix(BEARER_TOKEN_PREFIX).unwrap_or(token).trim();
        if token.is_empty() {
            return Err(AppError::new(ErrorCode::AccessTokenMissing));
        }

        let claims = self.tokens.decode_access_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
            AppError::with_message(ErrorCode::AccessTokenInvalid, "Token subject is not a user id")
                .caused_by(e)
        })?;

        self.users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::Unauthorized).context("user_id", user_id))
    }
}
