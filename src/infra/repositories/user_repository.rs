//! User repository implementation (hard delete, normalized email).

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use super::constraints::{translate_write, USER_RULES};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::entities::user_role::{self, Entity as UserRoleEntity};
use crate::domain::{normalize_email, User};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::infra::db::{in_transaction, WriteFailure};
use crate::ports::UserRepository;

const ENTITY: &str = "user";

/// SeaORM implementation of [`UserRepository`].
///
/// Emails are normalized on every read and write, so lookups are
/// case-insensitive regardless of what the caller passes.
#[derive(Clone)]
pub struct UserStore {
    db: Arc<DatabaseConnection>,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load_role_ids(&self, user_id: Uuid) -> AppResult<BTreeSet<Uuid>> {
        let rows = UserRoleEntity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(rows.into_iter().map(|row| row.role_id).collect())
    }

    async fn hydrate(&self, model: Option<user::Model>) -> AppResult<Option<User>> {
        match model {
            Some(model) => {
                let role_ids = self.load_role_ids(model.id).await?;
                Ok(Some(model.into_domain(role_ids)))
            }
            None => Ok(None),
        }
    }
}

/// Replace the role membership of `user_id` with `role_ids`.
async fn replace_roles<C>(conn: &C, user_id: Uuid, role_ids: &BTreeSet<Uuid>) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    UserRoleEntity::delete_many()
        .filter(user_role::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    insert_roles(conn, user_id, role_ids).await
}

async fn insert_roles<C>(conn: &C, user_id: Uuid, role_ids: &BTreeSet<Uuid>) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if role_ids.is_empty() {
        return Ok(());
    }

    let rows = role_ids.iter().map(|role_id| user_role::ActiveModel {
        user_id: Set(user_id),
        role_id: Set(*role_id),
    });
    UserRoleEntity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: User) -> AppResult<User> {
        let now = Utc::now();
        let role_ids = user.role_ids;
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(normalize_email(&user.email)),
            name: Set(user.name),
            age: Set(user.age),
            hashed_password: Set(user.hashed_password),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let model = active_model.insert(txn).await?;
                insert_roles(txn, model.id, &role_ids).await?;
                Ok::<_, WriteFailure>(model.into_domain(role_ids))
            })
        })
        .await
        .map_err(|failure| translate_write(failure, ENTITY, USER_RULES))?;

        tracing::info!(user_id = ?created.id, "User created");
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let model = UserEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        self.hydrate(model).await
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        let model = UserEntity::find()
            .filter(Expr::expr(Func::lower(Expr::col(user::Column::Email))).eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        self.hydrate(model).await
    }

    async fn save(&self, user: User) -> AppResult<User> {
        let id = user.id.ok_or_else(|| {
            AppError::not_found(ErrorCode::UserNotFound).context("reason", "user has no identity")
        })?;
        let email = normalize_email(&user.email);

        let saved = in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let now = Utc::now();
                let result = UserEntity::update_many()
                    .col_expr(user::Column::Email, Expr::value(email.clone()))
                    .col_expr(user::Column::Name, Expr::value(user.name.clone()))
                    .col_expr(user::Column::Age, Expr::value(user.age))
                    .col_expr(
                        user::Column::HashedPassword,
                        Expr::value(user.hashed_password.clone()),
                    )
                    .col_expr(user::Column::UpdatedAt, Expr::value(now))
                    .filter(user::Column::Id.eq(id))
                    .exec(txn)
                    .await?;

                if result.rows_affected == 0 {
                    return Err(WriteFailure::Rejected(
                        AppError::not_found(ErrorCode::UserNotFound).context("user_id", id),
                    ));
                }

                replace_roles(txn, id, &user.role_ids).await?;

                Ok(User {
                    id: Some(id),
                    email,
                    updated_at: now,
                    ..user
                })
            })
        })
        .await
        .map_err(|failure| translate_write(failure, ENTITY, USER_RULES))?;

        tracing::info!(user_id = %id, "User saved");
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // Hard delete; membership rows cascade
        let result = in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let result = UserEntity::delete_by_id(id).exec(txn).await?;
                Ok::<_, WriteFailure>(result)
            })
        })
        .await
        .map_err(|failure| translate_write(failure, ENTITY, USER_RULES))?;

        let deleted = result.rows_affected > 0;
        if deleted {
            tracing::info!(user_id = %id, "User deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, RuntimeErr};

    fn model(id: Uuid, email: &str) -> user::Model {
        let now = Utc::now();
        user::Model {
            id,
            email: email.to_string(),
            name: "Ada Lovelace".to_string(),
            age: 36,
            hashed_password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    /// Debug rendering of everything the mock connection executed
    fn transaction_log(db: Arc<DatabaseConnection>) -> String {
        let db = Arc::try_unwrap(db).unwrap_or_else(|_| panic!("connection still shared"));
        format!("{:?}", db.into_transaction_log())
    }

    #[tokio::test]
    async fn test_create_stores_normalized_email() {
        let id = Uuid::new_v4();
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(id, "ada@example.com")]])
            .into_connection()
            .into();

        let user = User::new(
            " Ada@EXAMPLE.com ".to_string(),
            "Ada Lovelace".to_string(),
            36,
            "$argon2id$hash".to_string(),
        );
        let created = UserStore::new(db.clone()).create(user).await.unwrap();

        assert_eq!(created.id, Some(id));
        assert_eq!(created.email, "ada@example.com");

        let log = transaction_log(db);
        assert!(log.contains("ada@example.com"));
        assert!(!log.contains("Ada@EXAMPLE.com"));
    }

    #[tokio::test]
    async fn test_create_duplicate_email_is_email_already_exists() {
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                r#"duplicate key value violates unique constraint "uq_users_email_ci""#.into(),
            ))])
            .into_connection()
            .into();

        let user = User::new("ada@example.com".into(), "Ada".into(), 36, "$argon2id$hash".into());
        let err = UserStore::new(db).create(user).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::EmailAlreadyExists);
    }

    #[tokio::test]
    async fn test_get_by_email_loads_roles() {
        let id = Uuid::new_v4();
        let role_id = Uuid::new_v4();
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(id, "ada@example.com")]])
            .append_query_results([vec![user_role::Model {
                user_id: id,
                role_id,
            }]])
            .into_connection()
            .into();

        let found = UserStore::new(db)
            .get_by_email("ADA@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, Some(id));
        assert!(found.has_role(role_id));
    }

    #[tokio::test]
    async fn test_get_by_id_absent_is_none() {
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection()
            .into();

        assert!(UserStore::new(db).get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_missing_user_is_not_found() {
        let id = Uuid::new_v4();
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection()
            .into();

        let mut user = model(id, "ada@example.com").into_domain(BTreeSet::new());
        user.name = "Countess".to_string();
        let err = UserStore::new(db).save(user).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn test_save_replaces_membership() {
        let id = Uuid::new_v4();
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(2), exec(1)])
            .into_connection()
            .into();

        let mut user = model(id, "ada@example.com").into_domain(BTreeSet::new());
        user.role_ids.insert(Uuid::new_v4());
        let saved = UserStore::new(db).save(user).await.unwrap();

        assert_eq!(saved.role_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_save_rolls_back_when_membership_replacement_fails() {
        let id = Uuid::new_v4();
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .append_exec_errors([DbErr::Exec(RuntimeErr::Internal("connection reset".into()))])
            .into_connection()
            .into();

        let mut user = model(id, "ada@example.com").into_domain(BTreeSet::new());
        user.name = "Countess".to_string();
        let err = UserStore::new(db.clone()).save(user).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);

        let log = transaction_log(db);
        assert!(log.contains("UPDATE"));
        assert!(log.contains("ROLLBACK"));
        assert!(!log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_delete_is_hard_and_reports_existence() {
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection()
            .into();
        let store = UserStore::new(db);
        let id = Uuid::new_v4();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
    }
}
