//! Repository ports.
//!
//! Deletion policy differs per aggregate: books are soft-deleted (the row
//! stays for audit reads), users and roles are removed outright.
//!
//! `save` on an entity whose identity is absent from the store is a
//! programming error and fails with the aggregate's not-found code; it is
//! never turned into a create.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Book, Role, User};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Book persistence port.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Active book by id; `BOOK_NOT_FOUND` when absent or soft-deleted
    async fn get_by_id(&self, id: Uuid) -> AppResult<Book>;

    /// Book by id regardless of its soft-delete marker (audit reads)
    async fn get_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Book>>;

    /// All active books; empty when none exist
    async fn get_all(&self) -> AppResult<Vec<Book>>;

    /// Insert a new book; the store assigns id, version and timestamps.
    ///
    /// # Errors
    /// `CONSTRAINT_VIOLATION` on duplicate (title, author) or invalid price.
    async fn create(&self, book: Book) -> AppResult<Book>;

    /// Persist changes to an existing book with an optimistic version check.
    ///
    /// # Errors
    /// - `BOOK_NOT_FOUND` if no active row has the book's id
    /// - `STALE_UPDATE` if the stored version differs from `book.version`
    /// - `CONSTRAINT_VIOLATION` on duplicate (title, author) or invalid price
    async fn save(&self, book: Book) -> AppResult<Book>;

    /// Soft delete; returns whether an active row existed
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// User persistence port.
///
/// Email lookups are case-insensitive; callers pass normalized emails.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    /// - `EMAIL_ALREADY_EXISTS` when the normalized email is taken
    /// - `CONSTRAINT_VIOLATION` when the age is out of range
    async fn create(&self, user: User) -> AppResult<User>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Persist changes to an existing user, including its role membership.
    ///
    /// # Errors
    /// `USER_NOT_FOUND` if the user does not exist.
    async fn save(&self, user: User) -> AppResult<User>;

    /// Hard delete; returns whether a row existed
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Role persistence port.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// `ROLE_NOT_FOUND` when absent
    async fn get_by_id(&self, id: Uuid) -> AppResult<Role>;

    async fn get_all(&self) -> AppResult<Vec<Role>>;

    /// `CONSTRAINT_VIOLATION` when the name is taken
    async fn create(&self, role: Role) -> AppResult<Role>;

    async fn save(&self, role: Role) -> AppResult<Role>;

    /// Hard delete; memberships referencing the role go with it
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}
