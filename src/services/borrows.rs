//! Borrow/return service: role and ownership rules around the state machine

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowRecord, BorrowRecordDetails},
        user::{Role, UserClaims},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for the acting user. Availability alone gates the
    /// transition, so a re-borrow by the same user is rejected the same
    /// way as anyone else's.
    pub async fn borrow(&self, book_id: i32, actor: &UserClaims) -> AppResult<BorrowRecord> {
        self.repository.borrows.borrow(book_id, actor.user_id).await
    }

    /// Return a book. A student may only return a book they borrowed
    /// themselves; a librarian may return on behalf of anyone.
    pub async fn return_book(&self, book_id: i32, actor: &UserClaims) -> AppResult<BorrowRecord> {
        let open = self
            .repository
            .borrows
            .find_open(book_id)
            .await?
            .ok_or_else(|| {
                AppError::NoActiveBorrow(format!(
                    "No active borrow record found for book {}",
                    book_id
                ))
            })?;

        if actor.role == Role::Student && open.user_id != actor.user_id {
            return Err(AppError::Authorization(
                "You can only return books you borrowed".to_string(),
            ));
        }

        // Close exactly the record the ownership check ran against; if it
        // was raced shut and a new borrow opened meanwhile, the repository
        // reports NoActiveBorrow instead of closing the newer record.
        self.repository
            .borrows
            .return_book(book_id, open.id, actor.user_id)
            .await
    }

    /// Borrow history: students see their own records, librarians see all
    pub async fn history(&self, actor: &UserClaims) -> AppResult<Vec<BorrowRecordDetails>> {
        match actor.role {
            Role::Student => self.repository.borrows.history_for_user(actor.user_id).await,
            Role::Librarian => self.repository.borrows.history_all().await,
        }
    }
}
