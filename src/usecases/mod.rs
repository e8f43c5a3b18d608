//! Use cases - one struct per business operation.
//!
//! Each use case receives its ports at construction, enforces the business
//! rules that are not storage constraints, and returns a domain entity or an
//! [`AppError`](crate::errors::AppError). Use cases never retry; a
//! `STALE_UPDATE` goes back to the caller.

mod auth;
mod books;
pub mod container;
mod roles;
mod users;

pub use auth::{
    AuthenticateUseCase, LoginCommand, LoginResult, LoginUserUseCase, RegisterUserCommand,
    RegisterUserUseCase, RegisteredUser,
};
pub use books::{
    CreateBookCommand, CreateBookUseCase, DeleteBookUseCase, GetAllBooksUseCase,
    GetBookByIdUseCase, UpdateBookCommand, UpdateBookUseCase,
};
pub use container::UseCases;
pub use roles::{CreateRoleUseCase, ListRolesUseCase};
pub use users::{
    ChangePasswordCommand, ChangePasswordUseCase, DeleteUserUseCase, UpdateProfileCommand,
    UpdateProfileUseCase,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Reject passwords shorter than the configured minimum
pub(crate) fn check_password_strength(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooWeak,
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        )
        .context("min_length", MIN_PASSWORD_LENGTH));
    }
    Ok(())
}
