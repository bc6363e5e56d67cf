//! Data models for Libris

pub mod author;
pub mod book;
pub mod borrow;
pub mod report;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use borrow::BorrowRecord;
pub use report::Report;
pub use user::{User, UserClaims};
