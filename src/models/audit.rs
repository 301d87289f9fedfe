//! Audit log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Closed set of auditable actions, stored as their string form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    Logout,
    Register,
    AddBook,
    EditBook,
    DeleteBook,
    Borrow,
    Return,
    UserMgmt,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::Register => "REGISTER",
            AuditAction::AddBook => "ADD_BOOK",
            AuditAction::EditBook => "EDIT_BOOK",
            AuditAction::DeleteBook => "DELETE_BOOK",
            AuditAction::Borrow => "BORROW",
            AuditAction::Return => "RETURN",
            AuditAction::UserMgmt => "USER_MGMT",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only audit entry. `user_id` is null for system events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditLog {
    pub id: i32,
    pub user_id: Option<i32>,
    pub action: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}
