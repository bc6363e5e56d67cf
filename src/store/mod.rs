//! Persistence layer.
//!
//! `Store` is the capability the domain services depend on: plain CRUD for
//! authors and books, transactional borrow/return updates, and the counts
//! feeding report generation. `PgStore` is the Postgres implementation;
//! `MemoryStore` is an in-process implementation used by unit tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, CreateBook, UpdateBook},
        borrow::BorrowRecord,
        user::User,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    // Authors
    async fn authors_list(&self) -> AppResult<Vec<Author>>;
    async fn authors_get(&self, id: i32) -> AppResult<Author>;
    async fn authors_create(&self, author: &CreateAuthor) -> AppResult<Author>;
    async fn authors_update(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author>;
    /// Deleting an author cascades to its books (and their borrow records).
    async fn authors_delete(&self, id: i32) -> AppResult<()>;

    // Books
    async fn books_list(&self) -> AppResult<Vec<Book>>;
    async fn books_get(&self, id: i32) -> AppResult<Book>;
    async fn books_create(&self, book: &CreateBook) -> AppResult<Book>;
    async fn books_update(&self, id: i32, book: &UpdateBook) -> AppResult<Book>;
    /// Deleting a book cascades to its borrow records.
    async fn books_delete(&self, id: i32) -> AppResult<()>;

    // Lending. Both operations apply the copy-counter update and the record
    // mutation as one atomic unit; concurrent borrows of a book with a single
    // remaining copy must not both succeed.
    async fn borrow_book(
        &self,
        book_id: i32,
        borrowed_by: &str,
        today: NaiveDate,
    ) -> AppResult<BorrowRecord>;
    async fn return_book(
        &self,
        record_id: i32,
        borrowed_by: &str,
        today: NaiveDate,
    ) -> AppResult<BorrowRecord>;

    // Report counts
    async fn count_authors(&self) -> AppResult<i64>;
    async fn count_books(&self) -> AppResult<i64>;
    /// Borrow records with a null return date (outstanding loans).
    async fn count_outstanding_borrows(&self) -> AppResult<i64>;

    // Users
    async fn users_get_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn users_create(&self, username: &str, password_hash: &str) -> AppResult<User>;
    async fn users_count(&self) -> AppResult<i64>;
}
