//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, borrows, health, reports, tokens};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "API for managing library books, authors, and borrowing records"
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        // Tokens
        tokens::issue_token,
        tokens::refresh_token,
        // Authors
        authors::list_authors,
        authors::create_author,
        authors::get_author,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::create_book,
        books::get_book,
        books::update_book,
        books::delete_book,
        // Borrow/return
        borrows::borrow_book,
        borrows::return_book,
        // Reports
        reports::generate_report,
        reports::latest_report,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowRequest,
            crate::models::report::Report,
            health::HealthResponse,
            tokens::TokenRequest,
            tokens::TokenPairResponse,
            tokens::TokenRefreshRequest,
            tokens::TokenRefreshResponse,
            reports::GenerateReportResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "tokens", description = "Token issuance and refresh"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book management"),
        (name = "borrow", description = "Borrow and return workflow"),
        (name = "reports", description = "Library activity reports")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
