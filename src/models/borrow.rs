//! Borrow record model and the borrow lifecycle constants

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// How long a book may be kept before it is due
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Compute the due date for a borrow starting at `borrow_date`
pub fn due_date_for(borrow_date: DateTime<Utc>) -> DateTime<Utc> {
    borrow_date + Duration::days(LOAN_PERIOD_DAYS)
}

/// A borrow record. Open iff `return_date` is absent. At most one open
/// record may exist per book (enforced by a partial unique index).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

/// A borrow record joined with its book and borrower, for history views.
/// Built by an explicit joined query; no lazy relationship traversal.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BorrowRecordDetails {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub book_author: String,
    pub user_id: i32,
    pub borrower_name: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn due_date_is_fourteen_days_out() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let due = due_date_for(start);
        assert_eq!((due - start).num_days(), 14);
        assert_eq!(due, Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn open_iff_no_return_date() {
        let now = Utc::now();
        let mut record = BorrowRecord {
            id: 1,
            book_id: 1,
            user_id: 1,
            borrow_date: now,
            due_date: due_date_for(now),
            return_date: None,
        };
        assert!(record.is_open());
        record.return_date = Some(now);
        assert!(!record.is_open());
    }
}
