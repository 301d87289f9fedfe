//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A catalog book. `is_available` is derived state: true iff no open
/// borrow record references this book.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: Option<String>,
    pub is_available: bool,
}

/// Payload for creating a book
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(length(min = 1, max = 20))]
    pub isbn: String,
    #[validate(length(max = 50))]
    pub category: Option<String>,
}

/// Payload for editing a book. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub isbn: Option<String>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
}

/// Catalog search query
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Substring matched against title, author and ISBN (case-insensitive)
    pub search: Option<String>,
}
