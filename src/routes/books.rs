//! Book routes.

#[cfg(test)]
#[path = "books_test.rs"]
mod books_test;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use canvas::doc::Listing;
use serde_json::{Value, json};

use super::ApiError;
use crate::services::books::{self, BookError, BookUpdate};
use crate::state::AppState;

/// `GET /api/books`: every book keyed by id, in store order.
pub async fn list_books(State(state): State<AppState>) -> Json<Listing> {
    Json(state.listing().await)
}

/// `PUT /api/books/{id}`: replace a book's corners or position and/or its
/// full name.
pub async fn update_book(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Result<Json<BookUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(update) = body?;
    match books::update_book(&state, &key, update).await {
        Ok(outcome) => Ok(Json(json!({
            "success": true,
            "message": format!("updated {key}"),
            "position_updated": outcome.position_updated,
            "name_updated": outcome.name_updated,
            "points_updated": outcome.position_updated && outcome.record.points.is_some(),
            "book": outcome.record,
        }))),
        Err(e @ BookError::NothingToUpdate) => Ok(Json(json!({ "success": false, "message": e.to_string() }))),
        Err(e) => Err(e.into()),
    }
}

/// `DELETE /api/books/{id}`: remove a book.
pub async fn delete_book(State(state): State<AppState>, Path(key): Path<String>) -> Result<Json<Value>, ApiError> {
    books::delete_book(&state, &key).await?;
    Ok(Json(json!({ "success": true })))
}
