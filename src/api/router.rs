use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, borrow_book, create_book, list_books, login, return_book, signup,
};

/// Creates the API router with all library endpoints
///
/// Accounts:
/// - POST /users/signup - Register a Reader or Author
/// - POST /users/login - Issue an access token
///
/// Catalog:
/// - POST /books/create - Add a book (Author)
/// - GET /books - List books with optional filters
///
/// Lending:
/// - POST /reader/books/borrow - Borrow a copy (Reader)
/// - POST /reader/books/return - Return a copy (Reader)
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/users/signup", post(signup))
        .route("/users/login", post(login))
        .route("/books", get(list_books))
        .route("/books/create", post(create_book))
        .route("/reader/books/borrow", post(borrow_book))
        .route("/reader/books/return", post(return_book))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
