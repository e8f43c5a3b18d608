//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `migrate` - Database migrations
//! - `roles` - Role administration

pub mod args;

pub use args::{Cli, Commands};
