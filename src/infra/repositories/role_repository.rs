//! Role repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::constraints::{translate_write, ROLE_RULES};
use super::entities::role::{self, ActiveModel, Entity as RoleEntity};
use crate::domain::role::normalize_role_name;
use crate::domain::Role;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::infra::db::{in_transaction, WriteFailure};
use crate::ports::RoleRepository;

const ENTITY: &str = "role";

fn role_not_found(id: Uuid) -> AppError {
    AppError::not_found(ErrorCode::RoleNotFound).context("role_id", id)
}

/// SeaORM implementation of [`RoleRepository`]
#[derive(Clone)]
pub struct RoleStore {
    db: Arc<DatabaseConnection>,
}

impl RoleStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Role> {
        let model = RoleEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        model.map(Role::from).ok_or_else(|| role_not_found(id))
    }

    async fn get_all(&self) -> AppResult<Vec<Role>> {
        let models = RoleEntity::find()
            .order_by_asc(role::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Role::from).collect())
    }

    async fn create(&self, role: Role) -> AppResult<Role> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(normalize_role_name(&role.name)),
        };

        let model = in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let model = active_model.insert(txn).await?;
                Ok::<_, WriteFailure>(model)
            })
        })
        .await
        .map_err(|failure| translate_write(failure, ENTITY, ROLE_RULES))?;

        tracing::info!(role_id = %model.id, name = %model.name, "Role created");
        Ok(Role::from(model))
    }

    async fn save(&self, role: Role) -> AppResult<Role> {
        let id = role.id.ok_or_else(|| {
            AppError::not_found(ErrorCode::RoleNotFound).context("reason", "role has no identity")
        })?;
        let name = normalize_role_name(&role.name);

        let saved = in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let result = RoleEntity::update_many()
                    .col_expr(role::Column::Name, Expr::value(name.clone()))
                    .filter(role::Column::Id.eq(id))
                    .exec(txn)
                    .await?;

                if result.rows_affected == 0 {
                    return Err(WriteFailure::Rejected(role_not_found(id)));
                }
                Ok(Role { id: Some(id), name })
            })
        })
        .await
        .map_err(|failure| translate_write(failure, ENTITY, ROLE_RULES))?;

        tracing::info!(role_id = %id, "Role saved");
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // Hard delete; memberships cascade
        let result = in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let result = RoleEntity::delete_by_id(id).exec(txn).await?;
                Ok::<_, WriteFailure>(result)
            })
        })
        .await
        .map_err(|failure| translate_write(failure, ENTITY, ROLE_RULES))?;

        Ok(result.rows_affected > 0)
    }
}
