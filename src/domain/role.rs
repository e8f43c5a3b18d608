//! Role domain entity.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MAX_ROLE_NAME_LENGTH;
use crate::errors::{AppError, AppResult};

static ROLE_SLUG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[-_][a-z0-9]+)*$").expect("role slug pattern is valid")
});

/// Named capability referenced (never owned) by users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Option<Uuid>,
    /// Lowercase, URL-safe slug: "admin", "customer", "moderator"
    pub name: String,
}

impl Role {
    /// Create an unsaved role from a raw name; the name is trimmed and lower-cased.
    pub fn new(name: &str) -> AppResult<Self> {
        let name = normalize_role_name(name);
        check_role_name(&name)?;
        Ok(Self { id: None, name })
    }
}

/// Canonical spelling of a role name
pub fn normalize_role_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validate an already normalized role name.
pub fn check_role_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::validation("Role name must not be empty").context("field", "name"));
    }
    if name.len() > MAX_ROLE_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Role name must be at most {} characters",
            MAX_ROLE_NAME_LENGTH
        ))
        .context("field", "name"));
    }
    if !ROLE_SLUG.is_match(name) {
        return Err(AppError::validation(
            "Role name must be a lowercase slug (letters, digits, '-' or '_')",
        )
        .context("field", "name")
        .context("name", name));
    }
    Ok(())
}
