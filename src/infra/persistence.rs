//! Repository set handed to the use cases.
//!
//! Bundles one implementation of each repository port so callers pick a
//! backing store once (database or in-memory) instead of per repository.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::memory::{InMemoryBookRepository, InMemoryRoleRepository, InMemoryUserRepository};
use super::repositories::{BookStore, RoleStore, UserStore};
use crate::ports::{BookRepository, RoleRepository, UserRepository};

/// Centralized access to all repositories
#[derive(Clone)]
pub struct Persistence {
    books: Arc<dyn BookRepository>,
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl Persistence {
    /// SeaORM stores sharing one connection pool
    pub fn new(db: DatabaseConnection) -> Self {
        let db = Arc::new(db);
        Self {
            books: Arc::new(BookStore::new(db.clone())),
            users: Arc::new(UserStore::new(db.clone())),
            roles: Arc::new(RoleStore::new(db)),
        }
    }

    /// Process-local stores; nothing survives a restart
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(InMemoryBookRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            roles: Arc::new(InMemoryRoleRepository::new()),
        }
    }

    /// Assemble from arbitrary implementations (mocks in tests)
    pub fn from_parts(
        books: Arc<dyn BookRepository>,
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
    ) -> Self {
        Self { books, users, roles }
    }

    pub fn books(&self) -> Arc<dyn BookRepository> {
        self.books.clone()
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    pub fn roles(&self) -> Arc<dyn RoleRepository> {
        self.roles.clone()
    }
}
