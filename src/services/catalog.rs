//! Catalog management service (authors and books)

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, CreateBook, UpdateBook},
    },
    store::Store,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.store.authors_list().await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.store.authors_get(id).await
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        self.store.authors_create(&author).await
    }

    pub async fn update_author(&self, id: i32, author: UpdateAuthor) -> AppResult<Author> {
        self.store.authors_update(id, &author).await
    }

    /// Delete an author; cascades to its books and their borrow records.
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.store.authors_delete(id).await
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.store.books_list().await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.store.books_get(id).await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        self.store.books_create(&book).await
    }

    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        self.store.books_update(id, &book).await
    }

    /// Delete a book; cascades to its borrow records.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.store.books_delete(id).await
    }
}
