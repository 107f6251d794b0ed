use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::{
    book_handlers, user_handlers,
    handlers::{AppState, create_loan, get_loan, list_loans, return_loan},
};

/// Creates the API router. All routes live under `/api`.
///
/// Public:
/// - GET /health
/// - POST /auth/register, POST /auth/login
/// - GET /books, GET /books/:id
///
/// Authenticated (cookie, bearer header or `token` query):
/// - GET /auth/refresh
/// - GET|POST /loans, GET /loans/:id, PUT /loans/:id/return
/// - GET|PUT /users/me
///
/// Admin only:
/// - POST /admin/books, PUT|DELETE /admin/books/:id
/// - GET /admin/users, GET|PUT|DELETE /admin/users/:id, PUT /admin/users/:id/promote
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Auth
        .route("/auth/register", post(user_handlers::register))
        .route("/auth/login", post(user_handlers::login))
        .route("/auth/refresh", get(user_handlers::refresh))
        // Catalog
        .route("/books", get(book_handlers::list_books))
        .route("/books/:id", get(book_handlers::get_book))
        // Loans
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/:id", get(get_loan))
        .route("/loans/:id/return", put(return_loan))
        // Current user
        .route(
            "/users/me",
            get(user_handlers::get_me).put(user_handlers::update_me),
        )
        // Admin
        .route("/admin/books", post(book_handlers::create_book))
        .route(
            "/admin/books/:id",
            put(book_handlers::update_book).delete(book_handlers::delete_book),
        )
        .route("/admin/users", get(user_handlers::list_users))
        .route(
            "/admin/users/:id",
            get(user_handlers::get_user)
                .put(user_handlers::update_user)
                .delete(user_handlers::delete_user),
        )
        .route("/admin/users/:id/promote", put(user_handlers::promote_user));

    Router::new()
        .nest("/api", api)
        // Add tracing middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
