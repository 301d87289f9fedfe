//! Audit trail service

use crate::{
    error::AppResult,
    models::audit::{AuditAction, AuditLog},
    repository::Repository,
};

/// Default and maximum number of entries returned by the monitoring view
pub const AUDIT_VIEW_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct AuditService {
    repository: Repository,
}

impl AuditService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Append an entry; storage failure surfaces as fatal
    pub async fn record(
        &self,
        action: AuditAction,
        details: &str,
        user_id: Option<i32>,
    ) -> AppResult<()> {
        self.repository.audit.record(action, details, user_id).await
    }

    /// Most recent entries for the monitoring view, capped at
    /// [`AUDIT_VIEW_LIMIT`]
    pub async fn recent(&self, limit: Option<i64>) -> AppResult<Vec<AuditLog>> {
        let limit = limit
            .unwrap_or(AUDIT_VIEW_LIMIT)
            .clamp(1, AUDIT_VIEW_LIMIT);
        self.repository.audit.recent(limit).await
    }
}
