use std::str::FromStr;

use tracing::{debug, warn};

use crate::domain::entities::edit::{CellKey, PendingEdit};
use crate::domain::entities::grid::SharedSnapshot;
use crate::domain::errors::GridError;
use crate::usecase::services::grid_store::GridStore;

/// What happens to an active edit when another cell starts editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupersedePolicy {
    #[default]
    Commit,
    Cancel,
}

impl FromStr for SupersedePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commit" => Ok(SupersedePolicy::Commit),
            "cancel" => Ok(SupersedePolicy::Cancel),
            other => Err(format!("unknown supersede policy: {other}")),
        }
    }
}

/// At most one pending cell edit, driven by explicit commands from the host UI.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    active: Option<PendingEdit>,
    policy: SupersedePolicy,
}

impl EditSession {
    pub fn new(policy: SupersedePolicy) -> Self {
        Self {
            active: None,
            policy,
        }
    }

    pub fn active(&self) -> Option<&PendingEdit> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn policy(&self) -> SupersedePolicy {
        self.policy
    }

    /// Fails without touching the current session when the new target does not exist.
    pub fn start_edit(
        &mut self,
        store: &mut GridStore,
        row_idx: usize,
        column: &str,
    ) -> Result<(), GridError> {
        store.check_cell(row_idx, column)?;

        if self.active.is_some() {
            match self.policy {
                SupersedePolicy::Commit => {
                    self.commit(store);
                }
                SupersedePolicy::Cancel => self.cancel(),
            }
        }

        let pending_value = store
            .snapshot()
            .cell(row_idx, column)
            .unwrap_or("")
            .to_string();
        debug!(row = row_idx, column, "edit started");
        self.active = Some(PendingEdit {
            target: CellKey::new(row_idx, column),
            pending_value,
        });
        Ok(())
    }

    pub fn update_pending(&mut self, value: impl Into<String>) {
        if let Some(edit) = self.active.as_mut() {
            edit.pending_value = value.into();
        }
    }

    /// Writes the pending value. Returns the new snapshot, or `None` when idle or
    /// when the target cell vanished (the session is cleared either way).
    pub fn commit(&mut self, store: &mut GridStore) -> Option<SharedSnapshot> {
        let edit = self.active.take()?;
        match store.set_cell(
            edit.target.row_idx,
            &edit.target.column,
            edit.pending_value,
        ) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(%err, "edit target vanished, dropping pending value");
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        if let Some(edit) = self.active.take() {
            debug!(
                row = edit.target.row_idx,
                column = %edit.target.column,
                "edit cancelled"
            );
        }
    }

    /// Drops the session after the store moved through history. Row indices
    /// taken before an undo or redo do not name the same rows afterwards.
    pub fn discard_after_history_move(&mut self) -> bool {
        let Some(edit) = self.active.take() else {
            return false;
        };
        warn!(
            row = edit.target.row_idx,
            column = %edit.target.column,
            "pending edit discarded by undo/redo"
        );
        true
    }

    /// Follows the edited row across a row removal; cancels if it was the removed row.
    pub fn rebase_after_row_removed(&mut self, removed: usize) {
        let Some(edit) = self.active.as_mut() else {
            return;
        };
        if edit.target.row_idx == removed {
            self.cancel();
        } else if edit.target.row_idx > removed {
            edit.target.row_idx -= 1;
        }
    }

    /// Cancels the session if it targets `column`.
    pub fn cancel_if_column(&mut self, column: &str) {
        if self
            .active
            .as_ref()
            .is_some_and(|edit| edit.target.column == column)
        {
            self.cancel();
        }
    }
}
