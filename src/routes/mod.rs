//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The record store's REST API under `/api`, plus `/healthz`. The editor
//! may be served from anywhere, so CORS is open to any origin.
//!
//! ERROR HANDLING
//! ==============
//! Handlers fail with [`ApiError`], rendered as `{"error": "…"}` with the
//! matching status. Malformed JSON bodies are reported the same way.

pub mod books;
pub mod search;
pub mod settings;


use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::services::books::BookError;
use crate::state::AppState;

/// All routes, bound to `state`.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/books", get(books::list_books))
        .route("/api/books/{id}", put(books::update_book).delete(books::delete_book))
        .route("/api/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/api/search", post(search::search_books))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<BookError> for ApiError {
    fn from(err: BookError) -> Self {
        let status = match err {
            BookError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        debug!(code = err.error_code(), error = %err, "book request rejected");
        Self { status, message: err.to_string() }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self { status: rejection.status(), message: rejection.body_text() }
    }
}
