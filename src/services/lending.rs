//! Lending service: the borrow/return workflow.
//!
//! The borrower identity always comes from the authenticated caller. The
//! store applies the copy-counter update and the record mutation as a single
//! atomic unit, so a reader never observes one without the other.

use std::sync::Arc;

use chrono::Utc;

use crate::{error::AppResult, models::borrow::BorrowRecord, store::Store};

#[derive(Clone)]
pub struct LendingService {
    store: Arc<dyn Store>,
}

impl LendingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Borrow a book: decrement its available copies and create an
    /// outstanding record stamped with today's date.
    pub async fn borrow(&self, book_id: i32, borrowed_by: &str) -> AppResult<BorrowRecord> {
        let record = self
            .store
            .borrow_book(book_id, borrowed_by, Utc::now().date_naive())
            .await?;
        tracing::info!(
            record_id = record.id,
            book_id,
            borrowed_by,
            "book borrowed"
        );
        Ok(record)
    }

    /// Return a borrowed book: stamp the return date and restore the copy.
    /// Only an outstanding record owned by the caller matches; anything else
    /// is a uniform NotFound.
    pub async fn return_book(&self, record_id: i32, borrowed_by: &str) -> AppResult<BorrowRecord> {
        let record = self
            .store
            .return_book(record_id, borrowed_by, Utc::now().date_naive())
            .await?;
        tracing::info!(record_id, borrowed_by, "book returned");
        Ok(record)
    }
}
