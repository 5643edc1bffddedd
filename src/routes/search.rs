//! Title search route, used by voice and keyboard lookup.

#[cfg(test)]
#[path = "search_test.rs"]
mod search_test;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::ApiError;
use crate::services::search::find_book;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub query: String,
}

/// `POST /api/search`: locate a book by (part of) its title.
///
/// A miss is still `200` with `success: false`; only an empty query is a
/// client error.
pub async fn search_books(
    State(state): State<AppState>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) = body?;
    let query = body.query.trim();
    if query.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, Json(json!({ "success": false, "error": "empty query" }))));
    }

    let books = state.books.read().await;
    let Some(book) = find_book(&books, query) else {
        debug!(%query, "search missed");
        return Ok((StatusCode::OK, Json(json!({ "success": false, "error": format!("no matching book: {query}") }))));
    };
    debug!(%query, key = %book.id, "search hit");

    let record = book.to_record();
    let mut reply = json!({
        "success": true,
        "book_key": book.id,
        "book_name": record.full_name,
        "position": record.position,
    });
    if let Some(points) = record.points {
        reply["points"] = json!(points);
    }
    Ok((StatusCode::OK, Json(reply)))
}
