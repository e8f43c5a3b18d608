//! Roles command - Role administration through the use cases.

use crate::cli::args::{RolesAction, RolesArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::usecases::UseCases;

/// Execute the roles command
pub async fn execute(args: RolesArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let use_cases = UseCases::from_connection(db.into_connection(), &config);

    match args.action {
        RolesAction::Create { name } => {
            let role = use_cases.create_role().execute(&name).await?;
            if let Some(id) = role.id {
                println!("{}\t{}", id, role.name);
            }
        }
        RolesAction::List => {
            for role in use_cases.list_roles().execute().await? {
                let id = role.id.map(|id| id.to_string()).unwrap_or_default();
                println!("{}\t{}", id, role.name);
            }
        }
    }

    Ok(())
}
