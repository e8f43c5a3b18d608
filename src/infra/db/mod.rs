//! Database connection and schema management.

use std::collections::HashSet;

use sea_orm::{Database as SeaDatabase, DatabaseConnection, EntityTrait};
use sea_orm_migration::{seaql_migrations, MigratorTrait};

use crate::config::Config;
use crate::errors::{AppError, AppResult};

pub mod migrations;
mod transaction;

pub use migrations::Migrator;
pub(crate) use transaction::{in_transaction, WriteFailure};

/// One migration and whether it has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

/// Owns the pooled connection the stores share.
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Connect and bring the schema up to date.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let db = Self::connect_without_migrations(config).await?;
        db.migrate_up().await?;

        tracing::info!("Database connected, schema up to date");
        Ok(db)
    }

    /// Connect and leave the schema alone (migration commands).
    pub async fn connect_without_migrations(config: &Config) -> AppResult<Self> {
        let connection = SeaDatabase::connect(&config.database_url)
            .await
            .map_err(|e| AppError::internal("Failed to connect to database").caused_by(e))?;
        Ok(Self { connection })
    }

    pub fn into_connection(self) -> DatabaseConnection {
        self.connection
    }

    pub async fn migrate_up(&self) -> AppResult<()> {
        Migrator::up(&self.connection, None)
            .await
            .map_err(|e| AppError::internal("Migration failed").caused_by(e))
    }

    /// Revert the most recent migration
    pub async fn migrate_down(&self) -> AppResult<()> {
        Migrator::down(&self.connection, Some(1))
            .await
            .map_err(|e| AppError::internal("Rollback failed").caused_by(e))
    }

    /// Drop every table, then apply all migrations again.
    pub async fn migrate_fresh(&self) -> AppResult<()> {
        Migrator::fresh(&self.connection)
            .await
            .map_err(|e| AppError::internal("Fresh migration failed").caused_by(e))
    }

    /// Known migrations in order, each flagged applied or pending.
    pub async fn migration_status(&self) -> AppResult<Vec<MigrationState>> {
        let applied: HashSet<String> = seaql_migrations::Entity::find()
            .all(&self.connection)
            .await
            .map_err(|e| AppError::internal("Could not read migration status").caused_by(e))?
            .into_iter()
            .map(|m| m.version)
            .collect();

        Ok(Migrator::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                MigrationState {
                    applied: applied.contains(&name),
                    name,
                }
            })
            .collect())
    }
}
