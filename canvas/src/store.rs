//! Record store client.
//!
//! The editor does not own item data; it reads and writes it through a
//! [`RecordStore`]. [`HttpStore`] speaks the store's REST API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list items | `GET /api/books` → `{ id: ItemRecord, … }` in store order |
//! | update item | `PUT /api/books/{id}` with an [`ItemUpdate`] body |
//! | delete item | `DELETE /api/books/{id}` |
//! | read settings | `GET /api/settings` |
//! | update settings | `PUT /api/settings` with a [`PartialSettings`] body |
//!
//! ERROR HANDLING
//! ==============
//! A non-2xx status or a `{"success": false}` body becomes
//! [`StoreError::Rejected`], whose message is the store's own `error` (or
//! `message`) text so the UI can show it verbatim.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::doc::{Item, ItemUpdate, Listing};
use crate::settings::{DisplaySettings, PartialSettings};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid store URL: {0}")]
    InvalidUrl(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "E_STORE_HTTP",
            Self::InvalidUrl(_) => "E_STORE_URL",
            Self::Rejected { .. } => "E_STORE_REJECTED",
            Self::Decode(_) => "E_STORE_DECODE",
        }
    }
}

/// Request/response access to the item collection and display settings.
///
/// Futures are not required to be `Send`; the editor runs on a single UI
/// thread (or the browser's event loop).
#[async_trait(?Send)]
pub trait RecordStore {
    /// Every item, in store order.
    async fn list_items(&self) -> Result<Vec<Item>, StoreError>;

    async fn update_item(&self, id: &str, update: &ItemUpdate) -> Result<(), StoreError>;

    async fn delete_item(&self, id: &str) -> Result<(), StoreError>;

    async fn settings(&self) -> Result<DisplaySettings, StoreError>;

    /// Merge `partial` into the stored settings and return the result.
    async fn update_settings(&self, partial: &PartialSettings) -> Result<DisplaySettings, StoreError>;
}

// =============================================================
// HTTP
// =============================================================

/// [`RecordStore`] over the store's REST API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
}

/// Status envelope of mutation responses.
#[derive(Debug, Default, Deserialize)]
struct Reply {
    success: Option<bool>,
    error: Option<String>,
    message: Option<String>,
}

impl HttpStore {
    /// Client for the store at `base_url` (e.g. `http://127.0.0.1:3000`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http: reqwest::Client::new(), base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/api/{segments…}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// Send `req`; return the body of a successful response.
    async fn send(req: reqwest::RequestBuilder) -> Result<String, StoreError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        classify(status, &body)?;
        Ok(body)
    }
}

/// Decide whether a response is a success. A non-2xx status or a
/// `"success": false` body is a rejection carrying the store's `error`,
/// else its `message`, else the status text.
fn classify(status: StatusCode, body: &str) -> Result<(), StoreError> {
    let reply = match serde_json::from_str::<Reply>(body) {
        Ok(reply) => reply,
        Err(e) => {
            debug!(%status, error = %e, "response body has no status envelope");
            Reply::default()
        }
    };
    if status.is_success() && reply.success != Some(false) {
        return Ok(());
    }

    let message = reply
        .error
        .or(reply.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());
    Err(StoreError::Rejected { status: status.as_u16(), message })
}

#[async_trait(?Send)]
impl RecordStore for HttpStore {
    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let body = Self::send(self.http.get(self.url(&["books"])?)).await?;
        let listing: Listing = serde_json::from_str(&body)?;
        debug!(count = listing.0.len(), "items listed");
        Ok(listing.into_items())
    }

    async fn update_item(&self, id: &str, update: &ItemUpdate) -> Result<(), StoreError> {
        Self::send(self.http.put(self.url(&["books", id])?).json(update)).await?;
        info!(%id, "item updated");
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        Self::send(self.http.delete(self.url(&["books", id])?)).await?;
        info!(%id, "item deleted");
        Ok(())
    }

    async fn settings(&self) -> Result<DisplaySettings, StoreError> {
        let body = Self::send(self.http.get(self.url(&["settings"])?)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn update_settings(&self, partial: &PartialSettings) -> Result<DisplaySettings, StoreError> {
        let body = Self::send(self.http.put(self.url(&["settings"])?).json(partial)).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

// =============================================================
// Test helpers
// =============================================================
