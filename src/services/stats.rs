//! Dashboard statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::user::UserClaims, repository::Repository};

/// Dashboard counters. `my_active_borrows` is only present for students.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_books: i64,
    pub available_books: i64,
    pub borrowed_books: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_active_borrows: Option<i64>,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self, actor: &UserClaims) -> AppResult<DashboardStats> {
        let total_books = self.repository.books.count_total().await?;
        let available_books = self.repository.books.count_available().await?;

        let my_active_borrows = if actor.is_librarian() {
            None
        } else {
            Some(
                self.repository
                    .borrows
                    .count_active_for_user(actor.user_id)
                    .await?,
            )
        };

        Ok(DashboardStats {
            total_books,
            available_books,
            borrowed_books: total_books - available_books,
            my_active_borrows,
        })
    }
}
