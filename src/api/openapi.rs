//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, circulation, health, stats, terms};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocalLibrary API",
        version = "1.0.0",
        description = "Library Catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::create_user,
        // Books & copies
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_copies,
        books::create_copy,
        books::delete_copy,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres & languages
        terms::list_genres,
        terms::create_genre,
        terms::delete_genre,
        terms::list_languages,
        terms::create_language,
        terms::delete_language,
        // Circulation
        circulation::my_loans,
        circulation::all_borrowed,
        circulation::renewal_form,
        circulation::renew,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            crate::models::user::AccountType,
            crate::models::user::CreateUser,
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::Genre,
            crate::models::book::Language,
            crate::models::book::CreateTerm,
            // Authors
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Copies & circulation
            crate::models::copy::BookCopy,
            crate::models::copy::CopyDetails,
            crate::models::copy::CopyStatus,
            crate::models::copy::CreateCopy,
            circulation::RenewalFormResponse,
            circulation::RenewRequest,
            circulation::RenewedResponse,
            circulation::RenewalRejection,
            // Stats
            crate::services::stats::CatalogCounts,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book and copy management"),
        (name = "authors", description = "Author management"),
        (name = "terms", description = "Genre and language reference tables"),
        (name = "circulation", description = "Borrowed listings and loan renewal"),
        (name = "stats", description = "Catalog statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
