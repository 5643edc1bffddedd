//! Store-backed editor: runs [`EngineCore`] requests against a [`RecordStore`].
//!
//! The core never performs I/O. When it asks for a save or delete, this
//! layer issues the store call, refreshes the collection, and feeds the
//! outcome back so late responses are reconciled against whatever is
//! selected by then.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use tracing::{debug, info, warn};

use crate::doc::{ItemId, ItemUpdate};
use crate::engine::{Action, EngineCore, SaveOutcome};
use crate::error::EditorError;
use crate::settings::{DisplaySettings, PartialSettings};
use crate::store::RecordStore;

pub struct Editor<S> {
    pub core: EngineCore,
    store: S,
}

impl<S: RecordStore> Editor<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { core: EngineCore::new(), store }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch every item from the store and replace the local collection.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Store`] if the listing fails; the local
    /// collection is left as it was.
    pub async fn refresh(&mut self) -> Result<Vec<Action>, EditorError> {
        let items = self.store.list_items().await?;
        info!(count = items.len(), "items loaded");
        Ok(self.core.load_items(items))
    }

    /// Start editing `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownItem`] if no such item is loaded.
    pub fn select(&mut self, id: &str) -> Result<Vec<Action>, EditorError> {
        self.core.select_item(id)
    }

    /// Validate and persist the session. The collection is reloaded from
    /// the store afterwards so the saved geometry is what the store holds.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] or [`EditorError::Incomplete`]
    /// without calling the store. Store failures are not errors here: they
    /// come back as [`Action::ShowError`] with the session intact. If the
    /// update lands but the reload fails, the save is still reported.
    pub async fn save(&mut self) -> Result<Vec<Action>, EditorError> {
        let request = self.core.save()?;
        debug!(id = %request.id, "saving item");
        let outcome = self.persist(&request.id, &request.update).await;
        Ok(self.core.finish_save(&request.id, outcome))
    }

    async fn persist(&self, id: &str, update: &ItemUpdate) -> SaveOutcome {
        if let Err(e) = self.store.update_item(id, update).await {
            return SaveOutcome::Rejected(e);
        }
        match self.store.list_items().await {
            Ok(items) => SaveOutcome::Saved(items),
            Err(e) => SaveOutcome::SavedUnrefreshed(e),
        }
    }

    /// Delete the selected item once `confirm` agrees.
    ///
    /// `confirm` receives the item's id and label. Declining leaves
    /// everything as it was.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] while idle. Store failures come
    /// back as [`Action::ShowError`].
    pub async fn delete_selected(&mut self, confirm: impl FnOnce(&str, &str) -> bool) -> Result<Vec<Action>, EditorError> {
        let Action::ConfirmDelete { id, label } = self.core.request_delete()? else {
            return Ok(Vec::new());
        };
        if !confirm(&id, &label) {
            debug!(%id, "delete declined");
            return Ok(Vec::new());
        }
        let Action::DeleteRequested { id } = self.core.delete_selected()? else {
            return Ok(Vec::new());
        };
        Ok(self.delete(id).await)
    }

    async fn delete(&mut self, id: ItemId) -> Vec<Action> {
        let outcome = self.store.delete_item(&id).await;
        self.core.finish_delete(&id, outcome)
    }

    /// Carry out whatever store work `actions` ask for and return the
    /// actions left for the UI. Deletes in this list are taken as already
    /// confirmed.
    pub async fn dispatch(&mut self, actions: Vec<Action>) -> Vec<Action> {
        let mut out = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                Action::SaveRequested(request) => {
                    let outcome = self.persist(&request.id, &request.update).await;
                    out.extend(self.core.finish_save(&request.id, outcome));
                }
                Action::DeleteRequested { id } => out.extend(self.delete(id).await),
                other => out.push(other),
            }
        }
        out
    }

    /// Current display settings.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Store`] if the store is unreachable.
    pub async fn settings(&self) -> Result<DisplaySettings, EditorError> {
        Ok(self.store.settings().await?)
    }

    /// Merge `partial` into the display settings.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Store`] if the store rejects the update.
    pub async fn update_settings(&self, partial: &PartialSettings) -> Result<DisplaySettings, EditorError> {
        let settings = self.store.update_settings(partial).await.inspect_err(|e| warn!(error = %e, "settings update failed"))?;
        info!("display settings updated");
        Ok(settings)
    }
}
