//! Postgres implementation of the store

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

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

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a foreign-key violation on books.author_id to a validation error.
fn map_book_insert_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_foreign_key_violation() {
            return AppError::Validation("Author not found.".to_string());
        }
        if db_err.is_unique_violation() {
            return AppError::Conflict("A book with this ISBN already exists.".to_string());
        }
    }
    AppError::Database(e)
}

#[async_trait]
impl Store for PgStore {
    async fn authors_list(&self) -> AppResult<Vec<Author>> {
        Ok(
            sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn authors_get(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Author not found.".to_string()))
    }

    async fn authors_create(&self, author: &CreateAuthor) -> AppResult<Author> {
        Ok(sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name, bio) VALUES ($1, $2) RETURNING *",
        )
        .bind(&author.name)
        .bind(&author.bio)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn authors_update(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET name = COALESCE($2, name),
                bio = COALESCE($3, bio)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&author.name)
        .bind(&author.bio)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Author not found.".to_string()))
    }

    async fn authors_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Author not found.".to_string()));
        }
        Ok(())
    }

    async fn books_list(&self) -> AppResult<Vec<Book>> {
        Ok(sqlx::query_as::<_, Book>(
            r#"
            SELECT b.*, a.name AS author_name
            FROM books b
            JOIN authors a ON a.id = b.author_id
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn books_get(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            SELECT b.*, a.name AS author_name
            FROM books b
            JOIN authors a ON a.id = b.author_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))
    }

    async fn books_create(&self, book: &CreateBook) -> AppResult<Book> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author_id, isbn, available_copies)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.isbn)
        .bind(book.available_copies)
        .fetch_one(&self.pool)
        .await
        .map_err(map_book_insert_error)?;

        self.books_get(id).await
    }

    async fn books_update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author_id = COALESCE($3, author_id),
                isbn = COALESCE($4, isbn),
                available_copies = COALESCE($5, available_copies)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.isbn)
        .bind(book.available_copies)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_book_insert_error)?
        .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))?;

        self.books_get(id).await
    }

    async fn books_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found.".to_string()));
        }
        Ok(())
    }

    async fn borrow_book(
        &self,
        book_id: i32,
        borrowed_by: &str,
        today: NaiveDate,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        // Conditional decrement: when two borrows race for the last copy,
        // only one of these UPDATEs can match.
        let book_title: Option<String> = sqlx::query_scalar(
            "UPDATE books SET available_copies = available_copies - 1 \
             WHERE id = $1 AND available_copies > 0 \
             RETURNING title",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let book_title = match book_title {
            Some(title) => title,
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                        .bind(book_id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(if exists {
                    AppError::Conflict("No available copies of this book.".to_string())
                } else {
                    AppError::NotFound("Book not found.".to_string())
                });
            }
        };

        let row = sqlx::query(
            r#"
            INSERT INTO borrow_records (book_id, borrowed_by, borrow_date, return_date)
            VALUES ($1, $2, $3, NULL)
            RETURNING id, borrow_date
            "#,
        )
        .bind(book_id)
        .bind(borrowed_by)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(BorrowRecord {
            id: row.get("id"),
            book_id,
            book_title,
            borrowed_by: borrowed_by.to_string(),
            borrow_date: row.get("borrow_date"),
            return_date: None,
        })
    }

    async fn return_book(
        &self,
        record_id: i32,
        borrowed_by: &str,
        today: NaiveDate,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        // One filter covers missing, not-yours and already-returned records.
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records br
            SET return_date = $3
            FROM books b
            WHERE br.id = $1 AND br.borrowed_by = $2 AND br.return_date IS NULL
              AND b.id = br.book_id
            RETURNING br.id, br.book_id, b.title AS book_title,
                      br.borrowed_by, br.borrow_date, br.return_date
            "#,
        )
        .bind(record_id)
        .bind(borrowed_by)
        .bind(today)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Borrow record not found or already returned.".to_string())
        })?;

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
            .bind(record.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn count_authors(&self) -> AppResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn count_books(&self) -> AppResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn count_outstanding_borrows(&self) -> AppResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_records WHERE return_date IS NULL")
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn users_get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn users_create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING *",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "Username already exists."))
    }

    async fn users_count(&self) -> AppResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }
}
