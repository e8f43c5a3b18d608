//! Migration: books table with soft delete and optimistic locking.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r#"CREATE TABLE IF NOT EXISTS books (
                id UUID PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                author VARCHAR(255) NOT NULL,
                price NUMERIC(10, 2) NOT NULL,
                description TEXT NULL,
                category VARCHAR(100) NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at TIMESTAMPTZ NULL,
                CONSTRAINT ck_books_price_positive CHECK (price > 0)
            )"#,
        )
        .await?;

        // Uniqueness only among active rows
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_books_title_author_ci \
             ON books (lower(title), lower(author)) WHERE deleted_at IS NULL",
        )
        .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_books_deleted_at")
                    .table(Books::Table)
                    .col(Books::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Books {
    Table,
    DeletedAt,
}
