//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Owning author; deleting the author cascades to its books.
    pub author_id: i32,
    /// Read-only, denormalized from the owning author.
    pub author_name: String,
    pub isbn: String,
    pub available_copies: i32,
}

fn default_copies() -> i32 {
    0
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: String,
    pub author_id: i32,
    #[validate(length(min = 10, max = 13, message = "ISBN must be 10 to 13 characters"))]
    pub isbn: String,
    #[serde(default = "default_copies")]
    #[validate(range(min = 0, message = "available_copies must not be negative"))]
    pub available_copies: i32,
}

/// Update book request. Fields left absent or null are unchanged
/// (partial update).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub author_id: Option<i32>,
    #[validate(length(min = 10, max = 13, message = "ISBN must be 10 to 13 characters"))]
    pub isbn: Option<String>,
    #[validate(range(min = 0, message = "available_copies must not be negative"))]
    pub available_copies: Option<i32>,
}
