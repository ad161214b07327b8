//! Case manager: turns view actions into store and graph operations.
//!
//! The manager owns the [`CaseStore`]. Whatever is selected on screen belongs
//! to the view and is passed in per call, so the manager itself keeps no UI
//! state.

use serde::Serialize;

use crate::error::CaseError;
use crate::graph::CaseGraph;
use crate::model::{Case, CaseFields, CaseId};
use crate::store::CaseStore;

/// Severity of a message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A user-visible message produced by a manager action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// The UI collaborator the manager reports to.
///
/// Implemented by the CLI printer, the terminal UI, and test doubles.
pub trait CaseView {
    /// Replace the displayed case list.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot present the list.
    fn show_cases(&mut self, cases: &[Case]) -> anyhow::Result<()>;

    /// Show a success, warning, or error message.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot present the message.
    fn notify(&mut self, notice: &Notice) -> anyhow::Result<()>;

    /// Hand a freshly built graph to the renderer.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot present the graph.
    fn show_graph(&mut self, graph: &CaseGraph) -> anyhow::Result<()>;
}

/// Result of a mutating action that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The store was changed (or, for a missing id, left alone) and the view
    /// refreshed.
    Applied,
    /// Nothing was selected; a warning was shown and the store left untouched.
    SelectionRequired,
}

/// Mediates between a [`CaseView`] and the [`CaseStore`].
#[derive(Debug)]
pub struct CaseManager {
    store: CaseStore,
}

impl CaseManager {
    #[must_use]
    pub const fn new(store: CaseStore) -> Self {
        Self { store }
    }

    /// Read-only access to the underlying store.
    #[must_use]
    pub const fn store(&self) -> &CaseStore {
        &self.store
    }

    /// Fetch every case and display it.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] when the read fails (after
    /// reporting it to the view) or any view error.
    pub fn list(&self, view: &mut dyn CaseView) -> anyhow::Result<Vec<Case>> {
        let cases = self.guarded(view, CaseStore::read_all)?;
        view.show_cases(&cases)?;
        Ok(cases)
    }

    /// Look up one case, for pre-filling an edit form.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] when the read fails.
    pub fn case(&self, id: CaseId) -> Result<Option<Case>, CaseError> {
        self.store.get(id)
    }

    /// Create a case from form input, refresh the list, report success.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] when the insert fails (after
    /// reporting it to the view) or any view error.
    pub fn add(&self, view: &mut dyn CaseView, fields: &CaseFields) -> anyhow::Result<CaseId> {
        let id = self.guarded(view, |store| store.create(fields))?;
        tracing::info!(id, "case added");
        self.list(view)?;
        view.notify(&Notice::success("Case added successfully!"))?;
        Ok(id)
    }

    /// Rewrite the selected case with form input.
    ///
    /// With nothing selected this only shows a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] when the update fails (after
    /// reporting it to the view) or any view error.
    pub fn edit(
        &self,
        view: &mut dyn CaseView,
        selection: Option<CaseId>,
        fields: &CaseFields,
    ) -> anyhow::Result<Outcome> {
        let Some(id) = selection else {
            return Self::selection_required(view, "edit");
        };
        let touched = self.guarded(view, |store| store.update(id, fields))?;
        if !touched {
            tracing::debug!(id, "edit targeted a case that no longer exists");
        }
        self.list(view)?;
        view.notify(&Notice::success("Case updated successfully!"))?;
        Ok(Outcome::Applied)
    }

    /// Delete the selected case.
    ///
    /// With nothing selected this only shows a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] when the delete fails (after
    /// reporting it to the view) or any view error.
    pub fn remove(
        &self,
        view: &mut dyn CaseView,
        selection: Option<CaseId>,
    ) -> anyhow::Result<Outcome> {
        let Some(id) = selection else {
            return Self::selection_required(view, "delete");
        };
        let touched = self.guarded(view, |store| store.delete(id))?;
        if !touched {
            tracing::debug!(id, "delete targeted a case that no longer exists");
        }
        self.list(view)?;
        view.notify(&Notice::success("Case deleted successfully!"))?;
        Ok(Outcome::Applied)
    }

    /// Build the co-occurrence graph from the current cases and hand it to the
    /// view.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] when the read fails (after
    /// reporting it to the view) or any view error.
    pub fn show_graph(&self, view: &mut dyn CaseView) -> anyhow::Result<CaseGraph> {
        let cases = self.guarded(view, CaseStore::read_all)?;
        let graph = CaseGraph::build(&cases);
        view.show_graph(&graph)?;
        Ok(graph)
    }

    fn selection_required(
        view: &mut dyn CaseView,
        action: &'static str,
    ) -> anyhow::Result<Outcome> {
        let reason = CaseError::SelectionRequired { action };
        tracing::debug!(%reason, "action skipped");
        view.notify(&Notice::warning("No case selected."))?;
        Ok(Outcome::SelectionRequired)
    }

    /// Run a store call; on failure, report it to the view before returning it.
    fn guarded<T>(
        &self,
        view: &mut dyn CaseView,
        op: impl FnOnce(&CaseStore) -> Result<T, CaseError>,
    ) -> anyhow::Result<T> {
        match op(&self.store) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::error!(error = %err, "case store operation failed");
                view.notify(&Notice::error(err.to_string()))?;
                Err(err.into())
            }
        }
    }
}
