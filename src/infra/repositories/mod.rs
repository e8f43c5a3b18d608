//! Repository layer - SeaORM adapters for the repository ports
//!
//! Adapters are the only code that sees storage failures; every write is
//! translated into a domain error before it leaves this module.

mod book_repository;
pub(crate) mod constraints;
pub(crate) mod entities;
mod role_repository;
mod user_repository;

pub use book_repository::BookStore;
pub use role_repository::RoleStore;
pub use user_repository::UserStore;
