//! Notification endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{error::AppResult, models::notification::Notification};

use super::AuthenticatedUser;

/// Unread notifications for the acting user, newest first
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread notifications", body = Vec<Notification>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_unread(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state.services.notifications.unread(&claims).await?;
    Ok(Json(notifications))
}

/// Mark a notification as read (owner only)
#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.notifications.mark_read(id, &claims).await?;
    Ok(StatusCode::NO_CONTENT)
}
