//! Borrow record model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Borrow record model from database.
/// A record with `return_date = NULL` is an outstanding loan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    /// Borrowed book; deleting the book cascades to its records.
    pub book_id: i32,
    /// Read-only, denormalized from the borrowed book.
    pub book_title: String,
    /// Username of the borrower, taken from the authenticated caller.
    pub borrowed_by: String,
    /// Set at creation, immutable thereafter.
    pub borrow_date: NaiveDate,
    /// Null while the loan is outstanding; setting it is a one-way transition.
    pub return_date: Option<NaiveDate>,
}

/// Borrow request body. `borrowed_by` is deliberately absent: the borrower
/// identity always comes from the authenticated caller, never the client.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// Book ID to borrow
    pub book: i32,
}
