//! Audit trail endpoints (librarian monitoring view)

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::AppResult, models::audit::AuditLog};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct AuditQuery {
    /// Maximum entries to return (capped at 100)
    pub limit: Option<i64>,
}

/// Most recent audit entries, newest first
#[utoipa::path(
    get,
    path = "/audit",
    tag = "audit",
    security(("bearer_auth" = [])),
    params(AuditQuery),
    responses(
        (status = 200, description = "Recent audit entries", body = Vec<AuditLog>),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn recent(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<Vec<AuditLog>>> {
    claims.require_librarian()?;

    let logs = state.services.audit.recent(query.limit).await?;
    Ok(Json(logs))
}
