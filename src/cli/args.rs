//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Bookstore - book catalogue and account administration
#[derive(Parser, Debug)]
#[command(name = "bookstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage roles
    Roles(RolesArgs),
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the roles command
#[derive(Parser, Debug)]
pub struct RolesArgs {
    #[command(subcommand)]
    pub action: RolesAction,
}

/// Role management actions
#[derive(Subcommand, Debug)]
pub enum RolesAction {
    /// Create a role (name is trimmed and lower-cased)
    Create {
        /// Role name (e.g., "admin")
        name: String,
    },
    /// List all roles
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_role_create() {
        let cli = Cli::parse_from(["bookstore", "-v", "roles", "create", "admin"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Roles(RolesArgs {
                action: RolesAction::Create { name },
            }) => assert_eq!(name, "admin"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parses_migrate_status() {
        let cli = Cli::parse_from(["bookstore", "migrate", "status"]);
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Status
            })
        ));
    }
}
