//! Translation of storage failures into domain errors.
//!
//! Each adapter owns a priority-ordered rule table. A failure is matched first
//! on the constraint identifier the database attaches to it, then (only when no
//! identifier is available) on the constraint name appearing in the message.
//! Anything else that is still an integrity failure becomes a generic
//! `CONSTRAINT_VIOLATION`; the rest is internal.

use sea_orm::{sqlx, DbErr, RuntimeErr};

use crate::errors::{AppError, ErrorCode, CONTEXT_VIOLATION, VIOLATION_DUPLICATE, VIOLATION_INVALID_VALUE};
use crate::infra::db::WriteFailure;

/// SQLSTATE class 23: integrity constraint violation
const INTEGRITY_SQLSTATE_CLASS: &str = "23";

pub(crate) const UQ_BOOKS_TITLE_AUTHOR: &str = "uq_books_title_author_ci";
pub(crate) const CK_BOOKS_PRICE_POSITIVE: &str = "ck_books_price_positive";
pub(crate) const UQ_USERS_EMAIL: &str = "uq_users_email_ci";
pub(crate) const CK_USERS_AGE_RANGE: &str = "ck_users_age_range";
pub(crate) const CK_USERS_HASHED_PASSWORD: &str = "ck_users_hashed_password_not_empty";
pub(crate) const FK_USER_ROLES_ROLE: &str = "fk_user_roles_role";
pub(crate) const UQ_ROLES_NAME: &str = "uq_roles_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Duplicate,
    InvalidValue,
}

impl Violation {
    fn as_str(self) -> &'static str {
        match self {
            Violation::Duplicate => VIOLATION_DUPLICATE,
            Violation::InvalidValue => VIOLATION_INVALID_VALUE,
        }
    }
}

/// One schema constraint and the domain error it stands for.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConstraintRule {
    /// Constraint identifiers, canonical name first
    pub names: &'static [&'static str],
    pub code: ErrorCode,
    pub violation: Violation,
    pub message: &'static str,
    pub field: &'static str,
}

impl ConstraintRule {
    fn to_error(self, entity: &str, constraint: &str) -> AppError {
        AppError::with_message(self.code, self.message)
            .context(CONTEXT_VIOLATION, self.violation.as_str())
            .context("entity", entity)
            .context("field", self.field)
            .context("constraint", constraint)
    }
}

pub(crate) const BOOK_RULES: &[ConstraintRule] = &[
    ConstraintRule {
        names: &[UQ_BOOKS_TITLE_AUTHOR, "uq_books_title_author"],
        code: ErrorCode::ConstraintViolation,
        violation: Violation::Duplicate,
        message: "title/author must be unique",
        field: "title",
    },
    ConstraintRule {
        names: &[CK_BOOKS_PRICE_POSITIVE],
        code: ErrorCode::ConstraintViolation,
        violation: Violation::InvalidValue,
        message: "price must be non-negative",
        field: "price",
    },
];

pub(crate) const USER_RULES: &[ConstraintRule] = &[
    ConstraintRule {
        names: &[UQ_USERS_EMAIL],
        code: ErrorCode::EmailAlreadyExists,
        violation: Violation::Duplicate,
        message: "Email already exists",
        field: "email",
    },
    ConstraintRule {
        names: &[CK_USERS_AGE_RANGE],
        code: ErrorCode::ConstraintViolation,
        violation: Violation::InvalidValue,
        message: "age must be between 0 and 150",
        field: "age",
    },
    ConstraintRule {
        names: &[FK_USER_ROLES_ROLE],
        code: ErrorCode::ConstraintViolation,
        violation: Violation::InvalidValue,
        message: "role does not exist",
        field: "role_ids",
    },
];

pub(crate) const ROLE_RULES: &[ConstraintRule] = &[ConstraintRule {
    names: &[UQ_ROLES_NAME],
    code: ErrorCode::ConstraintViolation,
    violation: Violation::Duplicate,
    message: "role name must be unique",
    field: "name",
}];

/// Storage diagnostics relevant to translation
#[derive(Debug, Default, PartialEq, Eq)]
struct Diagnostics {
    constraint: Option<String>,
    integrity: bool,
    message: String,
}

fn diagnose(err: &DbErr) -> Diagnostics {
    let runtime = match err {
        DbErr::Exec(runtime) | DbErr::Query(runtime) => runtime,
        other => {
            return Diagnostics {
                message: other.to_string(),
                ..Default::default()
            }
        }
    };

    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db)) => Diagnostics {
            constraint: db.constraint().map(str::to_owned),
            integrity: db
                .code()
                .map(|code| code.starts_with(INTEGRITY_SQLSTATE_CLASS))
                .unwrap_or(false),
            message: db.message().to_string(),
        },
        other => {
            let message = other.to_string();
            Diagnostics {
                integrity: message.contains("violates") && message.contains("constraint"),
                constraint: None,
                message,
            }
        }
    }
}

/// Find the first rule matching `diag`, identifier before message text.
fn match_rule<'r>(
    diag: &Diagnostics,
    rules: &'r [ConstraintRule],
) -> Option<(&'r ConstraintRule, &'static str)> {
    if let Some(constraint) = diag.constraint.as_deref() {
        return rules.iter().find_map(|rule| {
            rule.names
                .iter()
                .find(|name| **name == constraint)
                .map(|name| (rule, *name))
        });
    }

    rules.iter().find_map(|rule| {
        rule.names
            .iter()
            .find(|name| diag.message.contains(**name))
            .map(|name| (rule, *name))
    })
}

/// Error the rule table assigns to a named constraint.
///
/// Used by stores that enforce the schema constraints themselves, so both
/// kinds of store report a violation identically.
pub(crate) fn violation(rules: &[ConstraintRule], constraint: &str, entity: &str) -> AppError {
    let diag = Diagnostics {
        constraint: Some(constraint.to_string()),
        integrity: true,
        message: String::new(),
    };

    match match_rule(&diag, rules) {
        Some((rule, name)) => rule.to_error(entity, name),
        None => AppError::new(ErrorCode::ConstraintViolation)
            .context("entity", entity)
            .context("constraint", constraint),
    }
}

/// Re-express a raw storage error as exactly one domain error.
pub(crate) fn translate_db_err(err: DbErr, entity: &str, rules: &[ConstraintRule]) -> AppError {
    let diag = diagnose(&err);

    if let Some((rule, name)) = match_rule(&diag, rules) {
        return rule.to_error(entity, name).caused_by(err);
    }

    if diag.integrity || diag.constraint.is_some() {
        let mut translated = AppError::new(ErrorCode::ConstraintViolation).context("entity", entity);
        if let Some(constraint) = diag.constraint {
            translated = translated.context("constraint", constraint);
        }
        return translated.caused_by(err);
    }

    tracing::error!(entity, error = %err, "Untranslatable storage failure");
    AppError::internal(format!("Storage failure while writing {}", entity)).caused_by(err)
}

/// Translate a failed write after its transaction has been rolled back.
pub(crate) fn translate_write(
    failure: WriteFailure,
    entity: &str,
    rules: &[ConstraintRule],
) -> AppError {
    match failure {
        WriteFailure::Rejected(err) => err,
        WriteFailure::Stale {
            expected_version,
            actual_version,
        } => {
            tracing::warn!(entity, expected_version, ?actual_version, "Stale update rejected");
            let err = AppError::stale_update("stale update")
                .context("entity", entity)
                .context("expected_version", expected_version);
            match actual_version {
                Some(actual) => err.context("actual_version", actual),
                None => err,
            }
        }
        WriteFailure::Store(err) => translate_db_err(err, entity, rules),
    }
}
