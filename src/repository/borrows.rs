//! Borrow records repository — the borrow/return state machine.
//!
//! `borrow` and `return_book` each run as a single transaction holding a
//! row lock (`SELECT ... FOR UPDATE`) on the target book, so two concurrent
//! borrows of the same book cannot both succeed: exactly one observes the
//! availability flag flip and the other fails.

use chrono::Utc;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        audit::AuditAction,
        book::Book,
        borrow::{due_date_for, BorrowRecord, BorrowRecordDetails},
        notification,
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book for `user_id`. Creates the record, flips availability,
    /// notifies the borrower and appends the audit entry atomically.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::BookNotFound(format!("Book with id {} not found", book_id)))?;

        if !book.is_available {
            return Err(AppError::BookUnavailable(format!(
                "\"{}\" is currently borrowed",
                book.title
            )));
        }

        let now = Utc::now();
        let due_date = due_date_for(now);

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (book_id, user_id, borrow_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET is_available = FALSE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        insert_notification(
            &mut tx,
            user_id,
            &notification::borrow_message(&book.title, due_date),
        )
        .await?;

        insert_audit(
            &mut tx,
            Some(user_id),
            AuditAction::Borrow,
            &format!("Borrowed: {}", book.title),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(book_id, user_id, record_id = record.id, "book borrowed");

        Ok(record)
    }

    /// Return a book by closing the specific record the caller was
    /// authorized against. The student-ownership rule is enforced by the
    /// service on that same record; matching on `record_id` here means a
    /// record opened between the check and this transaction can never be
    /// closed in its place. `acting_user_id` only feeds the audit entry,
    /// while the notification goes to the original borrower.
    pub async fn return_book(
        &self,
        book_id: i32,
        record_id: i32,
        acting_user_id: i32,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::BookNotFound(format!("Book with id {} not found", book_id)))?;

        let now = Utc::now();

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records
            SET return_date = $2
            WHERE id = $3 AND book_id = $1 AND return_date IS NULL
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(now)
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NoActiveBorrow(format!(
                "No active borrow record found for book {}",
                book_id
            ))
        })?;

        sqlx::query("UPDATE books SET is_available = TRUE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        insert_notification(
            &mut tx,
            record.user_id,
            &notification::return_message(&book.title),
        )
        .await?;

        insert_audit(
            &mut tx,
            Some(acting_user_id),
            AuditAction::Return,
            &format!("Returned: {}", book.title),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            book_id,
            borrower_id = record.user_id,
            acting_user_id,
            "book returned"
        );

        Ok(record)
    }

    /// Find the unique open record for a book, if any
    pub async fn find_open(&self, book_id: i32) -> AppResult<Option<BorrowRecord>> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE book_id = $1 AND return_date IS NULL",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// History for one user, newest borrow first, joined with book and
    /// borrower details
    pub async fn history_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowRecordDetails>> {
        let records = sqlx::query_as::<_, BorrowRecordDetails>(
            r#"
            SELECT r.id, r.book_id, b.title AS book_title, b.author AS book_author,
                   r.user_id, u.full_name AS borrower_name,
                   r.borrow_date, r.due_date, r.return_date
            FROM borrow_records r
            JOIN books b ON r.book_id = b.id
            JOIN users u ON r.user_id = u.id
            WHERE r.user_id = $1
            ORDER BY r.borrow_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Full history across all users, newest borrow first
    pub async fn history_all(&self) -> AppResult<Vec<BorrowRecordDetails>> {
        let records = sqlx::query_as::<_, BorrowRecordDetails>(
            r#"
            SELECT r.id, r.book_id, b.title AS book_title, b.author AS book_author,
                   r.user_id, u.full_name AS borrower_name,
                   r.borrow_date, r.due_date, r.return_date
            FROM borrow_records r
            JOIN books b ON r.book_id = b.id
            JOIN users u ON r.user_id = u.id
            ORDER BY r.borrow_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Count a user's open borrows
    pub async fn count_active_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE user_id = $1 AND return_date IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

async fn insert_notification(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i32,
    message: &str,
) -> AppResult<()> {
    sqlx::query("INSERT INTO notifications (user_id, message, is_read) VALUES ($1, $2, FALSE)")
        .bind(user_id)
        .bind(message)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_audit(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Option<i32>,
    action: AuditAction,
    details: &str,
) -> AppResult<()> {
    sqlx::query("INSERT INTO audit_logs (user_id, action, details) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(action.as_str())
        .bind(details)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
