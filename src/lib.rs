//! Bookstore - repositories and use cases for books, users and roles
//!
//! Use cases talk to storage only through the repository ports; the SeaORM
//! adapters translate every storage failure into an [`AppError`] before it
//! reaches them.
//!
//! # Architecture Layers
//!
//! - **errors**: Domain error taxonomy and its transport mapping
//! - **domain**: Book, User and Role entities with their invariants
//! - **ports**: Repository, password and token interfaces
//! - **infra**: Database, SeaORM and in-memory repositories, Argon2, JWT
//! - **usecases**: One struct per business operation
//! - **config**: Application configuration and constants
//! - **cli** / **commands**: Command-line interface
//!
//! # CLI Usage
//!
//! ```bash
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Create a role
//! cargo run -- roles create admin
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod ports;
pub mod usecases;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{Book, Role, User};
pub use errors::{AppError, AppResult, ErrorCode, ErrorKind, ErrorSignal};
pub use usecases::UseCases;
