//! `migrate` - schema management for the books, users and roles tables.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config).await?;

    match args.action {
        MigrateAction::Up => {
            db.migrate_up().await?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down => {
            db.migrate_down().await?;
            tracing::info!("Reverted last migration");
        }
        MigrateAction::Status => {
            for state in db.migration_status().await? {
                let label = if state.applied { "applied" } else { "pending" };
                println!("{}\t{}", label, state.name);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping books, users, user_roles and roles before re-applying");
            db.migrate_fresh().await?;
            tracing::info!("Schema rebuilt");
        }
    }

    Ok(())
}
