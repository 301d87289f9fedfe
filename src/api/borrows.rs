//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrow::{BorrowRecord, BorrowRecordDetails},
};

use super::AuthenticatedUser;

/// Borrow response with the created record
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    pub record: BorrowRecord,
    pub message: String,
}

/// Return response with the closed record
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub status: String,
    pub record: BorrowRecord,
}

/// Borrow a book for the acting user
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = BorrowResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is currently unavailable")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let record = state.services.borrows.borrow(book_id, &claims).await?;

    let message = format!("Due date: {}", record.due_date.format("%Y-%m-%d"));
    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse { record, message }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 403, description = "Students may only return their own borrows"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "No active borrow record")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let record = state.services.borrows.return_book(book_id, &claims).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        record,
    }))
}

/// Borrow history: own records for students, all records for librarians
#[utoipa::path(
    get,
    path = "/borrows/history",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrow history, newest first", body = Vec<BorrowRecordDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecordDetails>>> {
    let records = state.services.borrows.history(&claims).await?;
    Ok(Json(records))
}
