//! Book use cases.
//!
//! Business rules (trimming, required fields, positive price) are checked
//! here; uniqueness and optimistic locking are left to the repository.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::Book;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::ports::BookRepository;

/// Trim optional free text; blank means absent
fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookCommand {
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub category: String,
}

pub struct CreateBookUseCase {
    books: Arc<dyn BookRepository>,
}

impl CreateBookUseCase {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    pub async fn execute(&self, cmd: CreateBookCommand) -> AppResult<Book> {
        let book = Book::new(
            cmd.title.trim().to_string(),
            cmd.author.trim().to_string(),
            cmd.price,
            clean_description(cmd.description),
            cmd.category.trim().to_string(),
        );
        book.check_invariants()?;

        self.books.create(book).await
    }
}

/// Partial update: `None` keeps the stored value.
///
/// `description: Some("")` clears the description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookCommand {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl UpdateBookCommand {
    fn apply(self, current: &Book) -> Book {
        let mut merged = current.clone();
        if let Some(title) = self.title {
            merged.title = title.trim().to_string();
        }
        if let Some(author) = self.author {
            merged.author = author.trim().to_string();
        }
        if let Some(price) = self.price {
            merged.price = price;
        }
        if let Some(description) = self.description {
            merged.description = clean_description(Some(description));
        }
        if let Some(category) = self.category {
            merged.category = category.trim().to_string();
        }
        merged
    }
}

pub struct UpdateBookUseCase {
    books: Arc<dyn BookRepository>,
}

impl UpdateBookUseCase {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    /// Merge `cmd` over the current book and save it.
    ///
    /// Fails with `STALE_UPDATE` if another writer saved the book between
    /// the read and the write; the caller re-reads and retries.
    pub async fn execute(&self, id: Uuid, cmd: UpdateBookCommand) -> AppResult<Book> {
        let current = self.books.get_by_id(id).await?;
        let merged = cmd.apply(&current);

        if merged == current {
            return Ok(current);
        }
        merged.check_invariants()?;

        self.books.save(merged).await
    }
}

pub struct DeleteBookUseCase {
    books: Arc<dyn BookRepository>,
}

impl DeleteBookUseCase {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    /// Soft delete; `BOOK_NOT_FOUND` if no active book has this id
    pub async fn execute(&self, id: Uuid) -> AppResult<()> {
        if self.books.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(ErrorCode::BookNotFound).context("book_id", id))
        }
    }
}

pub struct GetBookByIdUseCase {
    books: Arc<dyn BookRepository>,
}

impl GetBookByIdUseCase {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    pub async fn execute(&self, id: Uuid) -> AppResult<Book> {
        self.books.get_by_id(id).await
    }
}

pub struct GetAllBooksUseCase {
    books: Arc<dyn BookRepository>,
}

impl GetAllBooksUseCase {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    pub async fn execute(&self) -> AppResult<Vec<Book>> {
        self.books.get_all().await
    }
}
