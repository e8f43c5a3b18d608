//! In-memory reference implementations of the repository ports.
//!
//! They enforce the same invariants as the SeaORM stores (active-row
//! uniqueness, positive price, optimistic version check, soft delete, email
//! normalization) and report violations with the same errors, so use-case
//! tests can run against either kind of store.
//!
//! Role membership is not checked against the role store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::{INITIAL_VERSION, MAX_AGE, MIN_AGE};
use crate::domain::role::normalize_role_name;
use crate::domain::{normalize_email, Book, Role, User};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::infra::db::WriteFailure;
use crate::infra::repositories::constraints::{
    translate_write, violation, BOOK_RULES, CK_BOOKS_PRICE_POSITIVE, CK_USERS_AGE_RANGE,
    CK_USERS_HASHED_PASSWORD, ROLE_RULES, UQ_BOOKS_TITLE_AUTHOR, UQ_ROLES_NAME, UQ_USERS_EMAIL,
    USER_RULES,
};
use crate::ports::{BookRepository, RoleRepository, UserRepository};

/// Books keyed by id, soft-deleted rows included
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookRepository {
    books: Arc<RwLock<HashMap<Uuid, Book>>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_book_constraints(books: &HashMap<Uuid, Book>, book: &Book, own_id: Option<Uuid>) -> AppResult<()> {
    if book.price <= Decimal::ZERO {
        return Err(violation(BOOK_RULES, CK_BOOKS_PRICE_POSITIVE, "book"));
    }

    let key = book.uniqueness_key();
    let taken = books
        .values()
        .filter(|other| other.is_active() && other.id != own_id)
        .any(|other| other.uniqueness_key() == key);
    if taken {
        return Err(violation(BOOK_RULES, UQ_BOOKS_TITLE_AUTHOR, "book"));
    }

    Ok(())
}

fn book_not_found(id: Uuid) -> AppError {
    AppError::not_found(ErrorCode::BookNotFound).context("book_id", id)
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        let books = self.books.read().await;
        books
            .get(&id)
            .filter(|book| book.is_active())
            .cloned()
            .ok_or_else(|| book_not_found(id))
    }

    async fn get_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Book>> {
        let books = self.books.read().await;
        Ok(books.get(&id).cloned())
    }

    async fn get_all(&self) -> AppResult<Vec<Book>> {
        let books = self.books.read().await;
        let mut active: Vec<Book> = books.values().filter(|b| b.is_active()).cloned().collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(active)
    }

    async fn create(&self, book: Book) -> AppResult<Book> {
        let mut books = self.books.write().await;
        check_book_constraints(&books, &book, None)?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        let stored = Book {
            id: Some(id),
            version: INITIAL_VERSION,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            ..book
        };
        books.insert(id, stored.clone());

        tracing::info!(book_id = %id, "Book created");
        Ok(stored)
    }

    async fn save(&self, book: Book) -> AppResult<Book> {
        let id = book.id.ok_or_else(|| {
            AppError::not_found(ErrorCode::BookNotFound).context("reason", "book has no identity")
        })?;

        let mut books = self.books.write().await;
        let current = books
            .get(&id)
            .filter(|stored| stored.is_active())
            .ok_or_else(|| book_not_found(id))?;

        if current.version != book.version {
            let failure = WriteFailure::Stale {
                expected_version: book.version,
                actual_version: Some(current.version),
            };
            return Err(translate_write(failure, "book", BOOK_RULES));
        }
        check_book_constraints(&books, &book, Some(id))?;

        let created_at = current.created_at;
        let stored = Book {
            id: Some(id),
            version: book.version + 1,
            created_at,
            updated_at: Utc::now(),
            deleted_at: None,
            ..book
        };
        books.insert(id, stored.clone());

        tracing::info!(book_id = %id, version = stored.version, "Book saved");
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut books = self.books.write().await;
        match books.get_mut(&id) {
            Some(book) if book.is_active() => {
                let now = Utc::now();
                book.deleted_at = Some(now);
                book.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Users keyed by id; emails stored normalized
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_user_constraints(users: &HashMap<Uuid, User>, user: &User, own_id: Option<Uuid>) -> AppResult<()> {
    if !(MIN_AGE..=MAX_AGE).contains(&user.age) {
        return Err(violation(USER_RULES, CK_USERS_AGE_RANGE, "user"));
    }
    if user.hashed_password.is_empty() {
        return Err(violation(USER_RULES, CK_USERS_HASHED_PASSWORD, "user"));
    }
    let taken = users
        .values()
        .any(|other| other.id != own_id && other.email == user.email);
    if taken {
        return Err(violation(USER_RULES, UQ_USERS_EMAIL, "user"));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        let now = Utc::now();
        let id = Uuid::new_v4();
        let stored = User {
            id: Some(id),
            email: normalize_email(&user.email),
            created_at: now,
            updated_at: now,
            ..user
        };
        check_user_constraints(&users, &stored, None)?;
        users.insert(id, stored.clone());

        tracing::info!(user_id = %id, "User created");
        Ok(stored)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn save(&self, user: User) -> AppResult<User> {
        let id = user.id.ok_or_else(|| {
            AppError::not_found(ErrorCode::UserNotFound).context("reason", "user has no identity")
        })?;

        let mut users = self.users.write().await;
        let created_at = users
            .get(&id)
            .map(|current| current.created_at)
            .ok_or_else(|| AppError::not_found(ErrorCode::UserNotFound).context("user_id", id))?;

        let stored = User {
            email: normalize_email(&user.email),
            created_at,
            updated_at: Utc::now(),
            ..user
        };
        check_user_constraints(&users, &stored, Some(id))?;
        users.insert(id, stored.clone());

        tracing::info!(user_id = %id, "User saved");
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).is_some())
    }
}

/// Roles keyed by id
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleRepository {
    roles: Arc<RwLock<HashMap<Uuid, Role>>>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_role_name_free(roles: &HashMap<Uuid, Role>, name: &str, own_id: Option<Uuid>) -> AppResult<()> {
    if roles.values().any(|r| r.id != own_id && r.name == name) {
        return Err(violation(ROLE_RULES, UQ_ROLES_NAME, "role"));
    }
    Ok(())
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Role> {
        let roles = self.roles.read().await;
        roles
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(ErrorCode::RoleNotFound).context("role_id", id))
    }

    async fn get_all(&self) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let mut all: Vec<Role> = roles.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn create(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.write().await;
        let name = normalize_role_name(&role.name);
        check_role_name_free(&roles, &name, None)?;

        let id = Uuid::new_v4();
        let stored = Role { id: Some(id), name };
        roles.insert(id, stored.clone());
        Ok(stored)
    }

    async fn save(&self, role: Role) -> AppResult<Role> {
        let id = role.id.ok_or_else(|| {
            AppError::not_found(ErrorCode::RoleNotFound).context("reason", "role has no identity")
        })?;

        let mut roles = self.roles.write().await;
        if !roles.contains_key(&id) {
            return Err(AppError::not_found(ErrorCode::RoleNotFound).context("role_id", id));
        }
        let name = normalize_role_name(&role.name);
        check_role_name_free(&roles, &name, Some(id))?;

        let stored = Role { id: Some(id), name };
        roles.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut roles = self.roles.write().await;
        Ok(roles.remove(&id).is_some())
    }
}
