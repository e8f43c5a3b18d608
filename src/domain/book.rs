//! Book domain entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{MAX_AUTHOR_LENGTH, MAX_CATEGORY_LENGTH, MAX_TITLE_LENGTH};
use crate::errors::{AppError, AppResult};

/// Book domain entity with soft delete and optimistic locking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Assigned by the store on creation
    pub id: Option<Uuid>,
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub category: String,
    /// Incremented by exactly one on every successful save
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Create an unsaved book: no identity, version zero.
    pub fn new(
        title: String,
        author: String,
        price: Decimal,
        description: Option<String>,
        category: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title,
            author,
            price,
            description,
            category,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check if book is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if book is active (not deleted)
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Case-insensitive identity used for the (title, author) uniqueness rule
    pub fn uniqueness_key(&self) -> (String, String) {
        (self.title.to_lowercase(), self.author.to_lowercase())
    }

    /// Business invariants every persisted book satisfies.
    pub fn check_invariants(&self) -> AppResult<()> {
        check_text("title", "Title", &self.title, MAX_TITLE_LENGTH)?;
        check_text("author", "Author", &self.author, MAX_AUTHOR_LENGTH)?;
        check_text("category", "Category", &self.category, MAX_CATEGORY_LENGTH)?;

        if self.price <= Decimal::ZERO {
            return Err(AppError::validation("Price must be positive")
                .context("field", "price")
                .context("price", self.price));
        }

        Ok(())
    }
}

fn check_text(field: &'static str, label: &str, value: &str, max: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} must not be empty", label)).context("field", field));
    }
    if value.chars().count() > max {
        return Err(
            AppError::validation(format!("{} must be at most {} characters", label, max))
                .context("field", field),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use std::str::FromStr;

    fn book(title: &str, author: &str, price: &str) -> Book {
        Book::new(
            title.to_string(),
            author.to_string(),
            Decimal::from_str(price).unwrap(),
            None,
            "software".to_string(),
        )
    }

    #[test]
    fn test_new_book_is_unsaved() {
        let b = book("Refactoring", "Martin Fowler", "42.00");
        assert!(b.id.is_none());
        assert_eq!(b.version, 0);
        assert!(b.is_active());
    }

    #[test]
    fn test_invariants_accept_valid_book() {
        assert!(book("Refactoring", "Martin Fowler", "0.01").check_invariants().is_ok());
    }

    #[test]
    fn test_invariants_reject_blank_fields() {
        let err = book("   ", "Martin Fowler", "10").check_invariants().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Validation);
        assert_eq!(err.context_value("field"), Some("title"));

        let err = book("Refactoring", "", "10").check_invariants().unwrap_err();
        assert_eq!(err.context_value("field"), Some("author"));
    }

    #[test]
    fn test_invariants_reject_non_positive_price() {
        for price in ["0", "0.00", "-1.50"] {
            let err = book("Refactoring", "Martin Fowler", price)
                .check_invariants()
                .unwrap_err();
            assert_eq!(err.context_value("field"), Some("price"));
        }
    }

    #[test]
    fn test_uniqueness_key_ignores_case() {
        let a = book("Clean Code", "Robert Martin", "10");
        let b = book("CLEAN CODE", "robert martin", "12");
        assert_eq!(a.uniqueness_key(), b.uniqueness_key());
    }
}
