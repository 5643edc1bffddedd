//! Display settings routes. Settings live in memory only.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use canvas::settings::{DisplaySettings, PartialSettings};
use tracing::info;

use super::ApiError;
use crate::state::AppState;

/// `GET /api/settings`: current display settings.
pub async fn get_settings(State(state): State<AppState>) -> Json<DisplaySettings> {
    Json(state.settings.read().await.clone())
}

/// `PUT /api/settings`: merge the given fields and return the result.
pub async fn update_settings(
    State(state): State<AppState>,
    body: Result<Json<PartialSettings>, JsonRejection>,
) -> Result<Json<DisplaySettings>, ApiError> {
    let Json(partial) = body?;
    let mut settings = state.settings.write().await;
    settings.apply_partial(&partial);
    info!(?partial, "settings updated");
    Ok(Json(settings.clone()))
}
