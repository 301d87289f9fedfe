//! Notification service

use crate::{
    error::{AppError, AppResult},
    models::{notification::Notification, user::UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
}

impl NotificationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Unread notifications for the acting user, newest first
    pub async fn unread(&self, actor: &UserClaims) -> AppResult<Vec<Notification>> {
        self.repository.notifications.unread_for(actor.user_id).await
    }

    /// Mark a notification read. Only the owning user may do so.
    pub async fn mark_read(&self, id: i32, actor: &UserClaims) -> AppResult<()> {
        let notification = self.repository.notifications.get_by_id(id).await?;

        if notification.user_id != actor.user_id {
            return Err(AppError::Authorization(
                "You can only mark your own notifications as read".to_string(),
            ));
        }

        self.repository.notifications.mark_read(id).await
    }
}
