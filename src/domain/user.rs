//! User domain entity and related types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{MAX_AGE, MAX_NAME_LENGTH, MIN_AGE};
use crate::errors::{AppError, AppResult};

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<Uuid>,
    /// Always stored normalized (see [`crate::domain::normalize_email`])
    pub email: String,
    pub name: String,
    pub age: i32,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Role membership only; the role lifecycle belongs to the role repository
    pub role_ids: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unsaved user
    pub fn new(email: String, name: String, age: i32, hashed_password: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            email,
            name,
            age,
            hashed_password,
            role_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check membership of a role
    pub fn has_role(&self, role_id: Uuid) -> bool {
        self.role_ids.contains(&role_id)
    }

    /// Business invariants every persisted user satisfies.
    pub fn check_invariants(&self) -> AppResult<()> {
        check_name(&self.name)?;
        check_age(self.age)?;
        if self.hashed_password.is_empty() {
            return Err(AppError::internal("hashed password must not be empty"));
        }
        Ok(())
    }
}

pub fn check_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name must not be empty").context("field", "name"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_LENGTH
        ))
        .context("field", "name"));
    }
    Ok(())
}

pub fn check_age(age: i32) -> AppResult<()> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(AppError::validation(format!(
            "Age must be between {} and {}",
            MIN_AGE, MAX_AGE
        ))
        .context("field", "age")
        .context("age", age));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(age: i32) -> User {
        User::new("ada@example.com".into(), "Ada".into(), age, "$argon2id$hash".into())
    }

    #[test]
    fn test_age_bounds_inclusive() {
        assert!(user(0).check_invariants().is_ok());
        assert!(user(150).check_invariants().is_ok());
        assert!(user(-1).check_invariants().is_err());
        assert!(user(151).check_invariants().is_err());
    }

    #[test]
    fn test_hash_never_empty() {
        let mut u = user(30);
        u.hashed_password.clear();
        assert!(u.check_invariants().is_err());
    }

    #[test]
    fn test_role_membership() {
        let mut u = user(30);
        let role = Uuid::new_v4();
        assert!(!u.has_role(role));
        u.role_ids.insert(role);
        assert!(u.has_role(role));
    }
}
