//! Account maintenance use cases.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use super::check_password_strength;
use crate::domain::user::{check_age, check_name};
use crate::domain::User;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::ports::{PasswordService, UserRepository};

fn user_not_found(id: Uuid) -> AppError {
    AppError::not_found(ErrorCode::UserNotFound).context("user_id", id)
}

#[derive(Clone, Deserialize)]
pub struct ChangePasswordCommand {
    pub old_password: String,
    pub new_password: String,
}

impl fmt::Debug for ChangePasswordCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordCommand").finish_non_exhaustive()
    }
}

pub struct ChangePasswordUseCase {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl ChangePasswordUseCase {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Replace the password after verifying the old one.
    ///
    /// On `INVALID_CREDENTIALS` nothing is written.
    pub async fn execute(&self, user_id: Uuid, cmd: ChangePasswordCommand) -> AppResult<()> {
        let mut user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        if !self.passwords.verify_password(&cmd.old_password, &user.hashed_password) {
            tracing::warn!(user_id = %user_id, "Password change rejected: old password mismatch");
            return Err(AppError::with_message(
                ErrorCode::InvalidCredentials,
                "Old password is incorrect",
            ));
        }
        check_password_strength(&cmd.new_password)?;

        user.hashed_password = self.passwords.hash_password(&cmd.new_password)?;
        self.users.save(user).await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileCommand {
    pub name: Option<String>,
    pub age: Option<i32>,
}

pub struct UpdateProfileUseCase {
    users: Arc<dyn UserRepository>,
}

impl UpdateProfileUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Merge the provided fields over the stored profile and save.
    pub async fn execute(&self, user_id: Uuid, cmd: UpdateProfileCommand) -> AppResult<User> {
        let mut user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        if let Some(name) = cmd.name {
            let name = name.trim().to_string();
            check_name(&name)?;
            user.name = name;
        }
        if let Some(age) = cmd.age {
            check_age(age)?;
            user.age = age;
        }

        self.users.save(user).await
    }
}

pub struct DeleteUserUseCase {
    users: Arc<dyn UserRepository>,
}

impl DeleteUserUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Hard delete; `USER_NOT_FOUND` if there was no such user
    pub async fn execute(&self, user_id: Uuid) -> AppResult<()> {
        if self.users.delete(user_id).await? {
            tracing::info!(user_id = %user_id, "User deleted");
            Ok(())
        } else {
            Err(user_not_found(user_id))
        }
    }
}
