//! Audit log repository. Append-only: entries are never mutated or deleted.

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::audit::{AuditAction, AuditLog},
};

#[derive(Clone)]
pub struct AuditRepository {
    pool: Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an audit entry. `user_id` is absent for system events.
    pub async fn record(
        &self,
        action: AuditAction,
        details: &str,
        user_id: Option<i32>,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO audit_logs (user_id, action, details) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(action.as_str())
            .bind(details)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Most recent entries, newest first
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<AuditLog>> {
        let logs = sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs ORDER BY timestamp DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
