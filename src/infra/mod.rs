//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection, migrations and scoped write transactions
//! - SeaORM repositories and their constraint translation
//! - In-memory reference repositories
//! - Password hashing and access tokens

pub mod db;
pub mod memory;
pub mod persistence;
pub mod repositories;
pub mod security;

pub use db::{Database, Migrator};
pub use memory::{InMemoryBookRepository, InMemoryRoleRepository, InMemoryUserRepository};
pub use persistence::Persistence;
pub use repositories::{BookStore, RoleStore, UserStore};
pub use security::{Argon2PasswordService, JwtTokenService};
