//! Book repository implementation with soft delete and optimistic locking.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::constraints::{translate_write, BOOK_RULES};
use super::entities::book::{self, ActiveModel, Entity as BookEntity};
use crate::config::INITIAL_VERSION;
use crate::domain::Book;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::infra::db::{in_transaction, WriteFailure};
use crate::ports::BookRepository;

const ENTITY: &str = "book";

fn book_not_found(id: Uuid) -> AppError {
    AppError::not_found(ErrorCode::BookNotFound).context("book_id", id)
}

/// SeaORM implementation of [`BookRepository`].
///
/// All queries exclude soft-deleted rows except [`BookRepository::get_by_id_with_deleted`].
#[derive(Clone)]
pub struct BookStore {
    db: Arc<DatabaseConnection>,
}

impl BookStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for BookStore {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        let model = BookEntity::find_by_id(id)
            .filter(book::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        model.map(Book::from).ok_or_else(|| book_not_found(id))
    }

    async fn get_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Book>> {
        let model = BookEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(model.map(Book::from))
    }

    async fn get_all(&self) -> AppResult<Vec<Book>> {
        let models = BookEntity::find()
            .filter(book::Column::DeletedAt.is_null())
            .order_by_asc(book::Column::CreatedAt)
            .order_by_asc(book::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Book::from).collect())
    }

    async fn create(&self, book: Book) -> AppResult<Book> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(book.title),
            author: Set(book.author),
            price: Set(book.price),
            description: Set(book.description),
            category: Set(book.category),
            version: Set(INITIAL_VERSION),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let model = active_model.insert(txn).await?;
                Ok::<_, WriteFailure>(model)
            })
        })
        .await
        .map_err(|failure| translate_write(failure, ENTITY, BOOK_RULES))?;

        tracing::info!(book_id = %model.id, "Book created");
        Ok(Book::from(model))
    }

    async fn save(&self, book: Book) -> AppResult<Book> {
        let id = book.id.ok_or_else(|| {
            AppError::not_found(ErrorCode::BookNotFound).context("reason", "book has no identity")
        })?;
        let expected_version = book.version;

        let saved = in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let current = BookEntity::find_by_id(id)
                    .filter(book::Column::DeletedAt.is_null())
                    .one(txn)
                    .await?
                    .ok_or_else(|| book_not_found(id))?;

                if current.version != expected_version {
                    return Err(WriteFailure::Stale {
                        expected_version,
                        actual_version: Some(current.version),
                    });
                }

                let now = Utc::now();
                let next_version = expected_version + 1;

                // Compare-and-swap on the version read above
                let result = BookEntity::update_many()
                    .col_expr(book::Column::Title, Expr::value(book.title.clone()))
                    .col_expr(book::Column::Author, Expr::value(book.author.clone()))
                    .col_expr(book::Column::Price, Expr::value(book.price))
                    .col_expr(book::Column::Description, Expr::value(book.description.clone()))
                    .col_expr(book::Column::Category, Expr::value(book.category.clone()))
                    .col_expr(book::Column::Version, Expr::value(next_version))
                    .col_expr(book::Column::UpdatedAt, Expr::value(now))
                    .filter(book::Column::Id.eq(id))
                    .filter(book::Column::Version.eq(expected_version))
                    .filter(book::Column::DeletedAt.is_null())
                    .exec(txn)
                    .await?;

                if result.rows_affected == 0 {
                    return Err(WriteFailure::Stale {
                        expected_version,
                        actual_version: None,
                    });
                }

                Ok(Book {
                    id: Some(id),
                    version: next_version,
                    created_at: current.created_at,
                    updated_at: now,
                    deleted_at: None,
                    ..book
                })
            })
        })
        .await
        .map_err(|failure| translate_write(failure, ENTITY, BOOK_RULES))?;

        tracing::info!(book_id = %id, version = saved.version, "Book saved");
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let now = Utc::now();

        // Soft delete: set deleted_at on the active row only
        let result = in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let result = BookEntity::update_many()
                    .col_expr(book::Column::DeletedAt, Expr::value(Some(now)))
                    .col_expr(book::Column::UpdatedAt, Expr::value(now))
                    .filter(book::Column::Id.eq(id))
                    .filter(book::Column::DeletedAt.is_null())
                    .exec(txn)
                    .await?;
                Ok::<_, WriteFailure>(result)
            })
        })
        .await
        .map_err(|failure| translate_write(failure, ENTITY, BOOK_RULES))?;

        let deleted = result.rows_affected > 0;
        if deleted {
            tracing::info!(book_id = %id, "Book soft-deleted");
        }
        Ok(deleted)
    }
}
