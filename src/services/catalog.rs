//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        audit::AuditAction,
        book::{Book, CreateBook, UpdateBook},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search the catalog; no query returns all books in id order
    pub async fn search(&self, query: Option<&str>) -> AppResult<Vec<Book>> {
        self.repository.books.search(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Add a book. Duplicate ISBN is rejected before any write, so a
    /// failed add leaves the catalog unchanged.
    pub async fn add_book(&self, book: CreateBook, actor: &UserClaims) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict(format!(
                "A book with ISBN {} already exists",
                book.isbn
            )));
        }

        let created = self.repository.books.create(&book).await?;

        self.repository
            .audit
            .record(
                AuditAction::AddBook,
                &format!("Added book: {}", created.title),
                Some(actor.user_id),
            )
            .await?;

        Ok(created)
    }

    /// Edit a book; a changed ISBN must stay unique
    pub async fn edit_book(
        &self,
        id: i32,
        update: UpdateBook,
        actor: &UserClaims,
    ) -> AppResult<Book> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref isbn) = update.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "A book with ISBN {} already exists",
                    isbn
                )));
            }
        }

        let updated = self.repository.books.update(id, &update).await?;

        self.repository
            .audit
            .record(
                AuditAction::EditBook,
                &format!("Edited book: {}", updated.title),
                Some(actor.user_id),
            )
            .await?;

        Ok(updated)
    }

    /// Delete a book. Books referenced by borrow history (open or closed)
    /// are rejected with Conflict so foreign keys are never orphaned.
    pub async fn delete_book(&self, id: i32, actor: &UserClaims) -> AppResult<()> {
        let book = self.repository.books.get_by_id(id).await?;

        if self.repository.books.has_borrow_history(id).await? {
            return Err(AppError::Conflict(format!(
                "\"{}\" has borrow history and cannot be deleted",
                book.title
            )));
        }

        self.repository.books.delete(id).await?;

        self.repository
            .audit
            .record(
                AuditAction::DeleteBook,
                &format!("Deleted book: {}", book.title),
                Some(actor.user_id),
            )
            .await?;

        Ok(())
    }
}
