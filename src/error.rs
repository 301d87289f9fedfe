//! Error types for the Libris server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes surfaced in JSON error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchBook = 5,
    BookUnavailable = 6,
    Duplicate = 7,
    NoActiveBorrow = 8,
    BadValue = 9,
    NoSuchData = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Book unavailable: {0}")]
    BookUnavailable(String),

    #[error("No active borrow: {0}")]
    NoActiveBorrow(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code and error code used by the JSON response mapping
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            AppError::BookNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchBook),
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchUser),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::BookUnavailable(_) => (StatusCode::CONFLICT, ErrorCode::BookUnavailable),
            AppError::NoActiveBorrow(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::NoActiveBorrow)
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::BookNotFound(msg)
            | AppError::UserNotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::BookUnavailable(msg)
            | AppError::NoActiveBorrow(msg)
            | AppError::BadRequest(msg) => msg.clone(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Postgres unique-violation SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

/// Turn a unique-constraint violation into a `Conflict` with the given
/// message; any other database error passes through as `Database`. Used by
/// inserts whose existence pre-check can lose a race to a concurrent writer.
pub fn conflict_on_unique(err: sqlx::Error, message: impl Into<String>) -> AppError {
    match err.as_database_error().and_then(|e| e.code()) {
        Some(code) if code == UNIQUE_VIOLATION => AppError::Conflict(message.into()),
        _ => AppError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_race_maps_to_conflict() {
        let err = AppError::BookUnavailable("Book 1 is currently borrowed".into());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, ErrorCode::BookUnavailable);
    }

    #[test]
    fn missing_open_record_is_unprocessable() {
        let err = AppError::NoActiveBorrow("no open record for book 1".into());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, ErrorCode::NoActiveBorrow);
    }

    #[test]
    fn ownership_violation_is_forbidden() {
        let err = AppError::Authorization("You can only return books you borrowed".into());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, ErrorCode::NotAuthorized);
    }

    #[test]
    fn not_found_codes_name_the_entity() {
        let (status, code) = AppError::UserNotFound("User with id 9 not found".into())
            .status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, ErrorCode::NoSuchUser);

        let (status, code) = AppError::BookNotFound("Book with id 9 not found".into())
            .status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, ErrorCode::NoSuchBook);

        let (_, code) =
            AppError::NotFound("Notification with id 9 not found".into()).status_and_code();
        assert_eq!(code, ErrorCode::NoSuchData);
    }

    #[test]
    fn non_unique_errors_pass_through_as_database() {
        let err = conflict_on_unique(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(err, AppError::Database(_)));
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, ErrorCode::DbFailure);
    }

    #[test]
    fn duplicate_isbn_is_conflict() {
        let err = AppError::Conflict("A book with ISBN 001 already exists".into());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, ErrorCode::Duplicate);
    }
}
