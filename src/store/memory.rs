//! In-memory implementation of the store.
//!
//! Backs the unit tests so the domain operations run without a database.
//! All mutation happens under one mutex, which makes the borrow/return
//! counter-plus-record updates atomic by construction.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, CreateBook, UpdateBook},
        borrow::BorrowRecord,
        user::User,
    },
};

use super::Store;

#[derive(Default)]
struct Inner {
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, Book>,
    records: BTreeMap<i32, BorrowRecord>,
    users: BTreeMap<i32, User>,
    next_id: i32,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn authors_list(&self) -> AppResult<Vec<Author>> {
        Ok(self.inner.lock().unwrap().authors.values().cloned().collect())
    }

    async fn authors_get(&self, id: i32) -> AppResult<Author> {
        self.inner
            .lock()
            .unwrap()
            .authors
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Author not found.".to_string()))
    }

    async fn authors_create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let created = Author {
            id,
            name: author.name.clone(),
            bio: author.bio.clone(),
        };
        inner.authors.insert(id, created.clone());
        Ok(created)
    }

    async fn authors_update(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author> {
        let mut inner = self.inner.lock().unwrap();
        let existing = inner
            .authors
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Author not found.".to_string()))?;
        if let Some(ref name) = author.name {
            existing.name = name.clone();
        }
        if let Some(ref bio) = author.bio {
            existing.bio = Some(bio.clone());
        }
        let updated = existing.clone();
        // Keep the denormalized author_name on books current.
        for book in inner.books.values_mut() {
            if book.author_id == id {
                book.author_name = updated.name.clone();
            }
        }
        Ok(updated)
    }

    async fn authors_delete(&self, id: i32) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.authors.remove(&id).is_none() {
            return Err(AppError::NotFound("Author not found.".to_string()));
        }
        // Cascade: author -> books -> borrow records
        let book_ids: Vec<i32> = inner
            .books
            .values()
            .filter(|b| b.author_id == id)
            .map(|b| b.id)
            .collect();
        for book_id in book_ids {
            inner.books.remove(&book_id);
            inner.records.retain(|_, r| r.book_id != book_id);
        }
        Ok(())
    }

    async fn books_list(&self) -> AppResult<Vec<Book>> {
        Ok(self.inner.lock().unwrap().books.values().cloned().collect())
    }

    async fn books_get(&self, id: i32) -> AppResult<Book> {
        self.inner
            .lock()
            .unwrap()
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))
    }

    async fn books_create(&self, book: &CreateBook) -> AppResult<Book> {
        let mut inner = self.inner.lock().unwrap();
        let author_name = inner
            .authors
            .get(&book.author_id)
            .map(|a| a.name.clone())
            .ok_or_else(|| AppError::Validation("Author not found.".to_string()))?;
        if inner.books.values().any(|b| b.isbn == book.isbn) {
            return Err(AppError::Conflict(
                "A book with this ISBN already exists.".to_string(),
            ));
        }
        let id = inner.next_id();
        let created = Book {
            id,
            title: book.title.clone(),
            author_id: book.author_id,
            author_name,
            isbn: book.isbn.clone(),
            available_copies: book.available_copies,
        };
        inner.books.insert(id, created.clone());
        Ok(created)
    }

    async fn books_update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let mut inner = self.inner.lock().unwrap();
        // Existence first, then conflicts, matching the Postgres ordering.
        if !inner.books.contains_key(&id) {
            return Err(AppError::NotFound("Book not found.".to_string()));
        }
        if let Some(ref isbn) = book.isbn {
            if inner.books.values().any(|b| b.id != id && &b.isbn == isbn) {
                return Err(AppError::Conflict(
                    "A book with this ISBN already exists.".to_string(),
                ));
            }
        }
        let new_author = match book.author_id {
            Some(author_id) => Some(
                inner
                    .authors
                    .get(&author_id)
                    .map(|a| (author_id, a.name.clone()))
                    .ok_or_else(|| AppError::Validation("Author not found.".to_string()))?,
            ),
            None => None,
        };
        let existing = inner
            .books
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))?;
        if let Some(ref title) = book.title {
            existing.title = title.clone();
        }
        if let Some((author_id, author_name)) = new_author {
            existing.author_id = author_id;
            existing.author_name = author_name;
        }
        if let Some(ref isbn) = book.isbn {
            existing.isbn = isbn.clone();
        }
        if let Some(copies) = book.available_copies {
            existing.available_copies = copies;
        }
        Ok(existing.clone())
    }

    async fn books_delete(&self, id: i32) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.books.remove(&id).is_none() {
            return Err(AppError::NotFound("Book not found.".to_string()));
        }
        inner.records.retain(|_, r| r.book_id != id);
        Ok(())
    }

    async fn borrow_book(
        &self,
        book_id: i32,
        borrowed_by: &str,
        today: NaiveDate,
    ) -> AppResult<BorrowRecord> {
        let mut inner = self.inner.lock().unwrap();
        let book = inner
            .books
            .get_mut(&book_id)
            .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))?;
        if book.available_copies <= 0 {
            return Err(AppError::Conflict(
                "No available copies of this book.".to_string(),
            ));
        }
        book.available_copies -= 1;
        let book_title = book.title.clone();
        let id = inner.next_id();
        let record = BorrowRecord {
            id,
            book_id,
            book_title,
            borrowed_by: borrowed_by.to_string(),
            borrow_date: today,
            return_date: None,
        };
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    async fn return_book(
        &self,
        record_id: i32,
        borrowed_by: &str,
        today: NaiveDate,
    ) -> AppResult<BorrowRecord> {
        let mut inner = self.inner.lock().unwrap();
        let mut record = match inner.records.get_mut(&record_id) {
            Some(r) if r.borrowed_by == borrowed_by && r.return_date.is_none() => {
                r.return_date = Some(today);
                r.clone()
            }
            _ => {
                return Err(AppError::NotFound(
                    "Borrow record not found or already returned.".to_string(),
                ))
            }
        };
        if let Some(book) = inner.books.get_mut(&record.book_id) {
            book.available_copies += 1;
            record.book_title = book.title.clone();
        }
        Ok(record)
    }

    async fn count_authors(&self) -> AppResult<i64> {
        Ok(self.inner.lock().unwrap().authors.len() as i64)
    }

    async fn count_books(&self) -> AppResult<i64> {
        Ok(self.inner.lock().unwrap().books.len() as i64)
    }

    async fn count_outstanding_borrows(&self) -> AppResult<i64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .records
            .values()
            .filter(|r| r.return_date.is_none())
            .count() as i64)
    }

    async fn users_get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn users_create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict("Username already exists.".to_string()));
        }
        let id = inner.next_id();
        let user = User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn users_count(&self) -> AppResult<i64> {
        Ok(self.inner.lock().unwrap().users.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::author::CreateAuthor;
    use crate::models::book::CreateBook;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    async fn seed_book(store: &MemoryStore, copies: i32) -> Book {
        let author = store
            .authors_create(&CreateAuthor {
                name: "A".to_string(),
                bio: None,
            })
            .await
            .unwrap();
        store
            .books_create(&CreateBook {
                title: "B".to_string(),
                author_id: author.id,
                isbn: "1111111111111".to_string(),
                available_copies: copies,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn book_carries_author_name_and_follows_rename() {
        let store = MemoryStore::new();
        let book = seed_book(&store, 1).await;
        assert_eq!(book.author_name, "A");

        store
            .authors_update(
                book.author_id,
                &crate::models::author::UpdateAuthor {
                    name: Some("A. Renamed".to_string()),
                    bio: None,
                },
            )
            .await
            .unwrap();

        let book = store.books_get(book.id).await.unwrap();
        assert_eq!(book.author_name, "A. Renamed");
    }

    #[tokio::test]
    async fn update_with_absent_fields_keeps_existing_values() {
        let store = MemoryStore::new();
        let author = store
            .authors_create(&CreateAuthor {
                name: "A".to_string(),
                bio: Some("original bio".to_string()),
            })
            .await
            .unwrap();

        // Partial update: absent fields are left unchanged.
        let updated = store
            .authors_update(
                author.id,
                &crate::models::author::UpdateAuthor {
                    name: Some("A2".to_string()),
                    bio: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "A2");
        assert_eq!(updated.bio.as_deref(), Some("original bio"));
    }

    #[tokio::test]
    async fn updating_missing_book_is_not_found_even_on_isbn_collision() {
        let store = MemoryStore::new();
        let book = seed_book(&store, 1).await;

        let err = store
            .books_update(
                9999,
                &crate::models::book::UpdateBook {
                    title: None,
                    author_id: None,
                    isbn: Some(book.isbn.clone()),
                    available_copies: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_isbn_rejected() {
        let store = MemoryStore::new();
        let book = seed_book(&store, 1).await;
        let err = store
            .books_create(&CreateBook {
                title: "Other".to_string(),
                author_id: book.author_id,
                isbn: book.isbn.clone(),
                available_copies: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn author_delete_cascades_to_books_and_records() {
        let store = MemoryStore::new();
        let book = seed_book(&store, 1).await;
        store.borrow_book(book.id, "u1", today()).await.unwrap();

        store.authors_delete(book.author_id).await.unwrap();

        assert_eq!(store.count_books().await.unwrap(), 0);
        assert_eq!(store.count_outstanding_borrows().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn book_delete_cascades_to_records() {
        let store = MemoryStore::new();
        let book = seed_book(&store, 1).await;
        store.borrow_book(book.id, "u1", today()).await.unwrap();

        store.books_delete(book.id).await.unwrap();

        assert_eq!(store.count_outstanding_borrows().await.unwrap(), 0);
    }
}
