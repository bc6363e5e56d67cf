//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{error::AppResult, models::borrow::{BorrowRecord, BorrowRequest}};

use super::AuthenticatedUser;

/// Borrow a book. The borrower identity is the authenticated caller; any
/// client-supplied identity is ignored by the request shape.
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "borrow",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Borrow record created", body = BorrowRecord),
        (status = 400, description = "No available copies"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    let record = state
        .services
        .lending
        .borrow(request.book, &claims.sub)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a borrowed book. Missing, already-returned and not-owned records
/// all answer with the same 404.
#[utoipa::path(
    put,
    path = "/borrow/{id}/return",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Book returned", body = BorrowRecord),
        (status = 404, description = "Borrow record not found or already returned")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state.services.lending.return_book(id, &claims.sub).await?;
    Ok(Json(record))
}
