//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A per-user message emitted by the borrow/return engine
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Message for a successful borrow, carrying the due date
pub fn borrow_message(title: &str, due_date: DateTime<Utc>) -> String {
    format!(
        "You have borrowed \"{}\". Due date: {}",
        title,
        due_date.format("%Y-%m-%d")
    )
}

/// Message for a successful return, addressed to the original borrower
pub fn return_message(title: &str) -> String {
    format!("You have returned \"{}\".", title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn borrow_message_carries_due_date() {
        let due = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(
            borrow_message("Dune", due),
            "You have borrowed \"Dune\". Due date: 2026-03-15"
        );
    }

    #[test]
    fn return_message_names_the_book() {
        assert_eq!(return_message("Dune"), "You have returned \"Dune\".");
    }
}
