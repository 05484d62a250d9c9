use std::num::NonZeroUsize;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::domain::entities::edit::PendingEdit;
use crate::domain::entities::grid::{Row, SharedSnapshot};
use crate::domain::entities::query::{
    FileId, FilterSpec, PageSpec, SearchSpec, SortSpec, ViewResult,
};
use crate::domain::errors::GridError;
use crate::usecase::ports::gateway::{
    ExportFormat, GatewayError, PersistenceGateway, SaveAck, TabularData,
};
use crate::usecase::services::edit_session::EditSession;
use crate::usecase::services::grid_store::GridStore;
use crate::usecase::services::view_pipeline::compute_view;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("loaded {loaded} of {total} stored rows; load the whole file before saving")]
    PartialWindow { loaded: usize, total: usize },
}

/// Grid contents captured when a save is issued.
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub file_id: FileId,
    pub revision: u64,
    pub data: TabularData,
}

/// One open file: its grid, the active edit, the view parameters and save state.
pub struct GridViewer {
    gateway: Arc<dyn PersistenceGateway>,
    file_id: FileId,
    store: GridStore,
    session: EditSession,
    search: SearchSpec,
    filters: FilterSpec,
    sort: Option<SortSpec>,
    page: PageSpec,
    remote_page: usize,
    remote_page_size: NonZeroUsize,
    remote_total_rows: usize,
    loaded_rows: usize,
    saved_revision: u64,
}

impl GridViewer {
    pub fn open(
        gateway: Arc<dyn PersistenceGateway>,
        file_id: FileId,
        config: &EngineConfig,
    ) -> Result<Self, ViewerError> {
        let mut viewer = Self {
            gateway,
            file_id,
            store: GridStore::new(config.history),
            session: EditSession::new(config.supersede),
            search: SearchSpec::default(),
            filters: FilterSpec::default(),
            sort: None,
            page: PageSpec::first(config.page_size),
            remote_page: 1,
            remote_page_size: config.load_page_size,
            remote_total_rows: 0,
            loaded_rows: 0,
            saved_revision: 0,
        };
        viewer.load_page(1)?;
        Ok(viewer)
    }

    /// Replaces the grid with one remote page. History restarts from the loaded data.
    pub fn load_page(&mut self, remote_page: usize) -> Result<SharedSnapshot, ViewerError> {
        let remote_page = remote_page.max(1);
        let loaded = self
            .gateway
            .load(self.file_id, remote_page, self.remote_page_size)
            .inspect_err(|err| warn!(%err, "load failed"))?;

        let rows = loaded
            .rows
            .iter()
            .map(|values| Row::from_values(&loaded.columns, values))
            .collect();
        let snapshot = self.store.initialize(loaded.columns, rows)?;

        self.session.cancel();
        self.remote_page = remote_page;
        self.remote_total_rows = loaded.total_rows;
        self.loaded_rows = snapshot.row_count();
        self.saved_revision = self.store.revision();
        self.page.page = 1;
        info!(
            file = %self.file_id,
            page = remote_page,
            rows = snapshot.row_count(),
            total = loaded.total_rows,
            "page loaded"
        );
        Ok(snapshot)
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn snapshot(&self) -> &SharedSnapshot {
        self.store.snapshot()
    }

    pub fn store(&self) -> &GridStore {
        &self.store
    }

    pub fn remote_page(&self) -> usize {
        self.remote_page
    }

    pub fn remote_total_rows(&self) -> usize {
        self.remote_total_rows
    }

    pub fn view(&self) -> ViewResult {
        compute_view(
            self.store.snapshot(),
            &self.search,
            &self.filters,
            self.sort.as_ref(),
            &self.page,
        )
    }

    pub fn page(&self) -> PageSpec {
        self.page
    }

    pub fn search(&self) -> &SearchSpec {
        &self.search
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = SearchSpec::new(text);
        self.page.page = 1;
    }

    pub fn set_filter(&mut self, column: impl Into<String>, pattern: impl Into<String>) {
        self.filters.set(column, pattern);
        self.page.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        self.page = PageSpec::first(page_size);
    }

    pub fn pending_edit(&self) -> Option<&PendingEdit> {
        self.session.active()
    }

    pub fn start_edit(&mut self, row_idx: usize, column: &str) -> Result<(), ViewerError> {
        self.session.start_edit(&mut self.store, row_idx, column)?;
        Ok(())
    }

    pub fn update_pending(&mut self, value: impl Into<String>) {
        self.session.update_pending(value);
    }

    pub fn commit_edit(&mut self) -> Option<SharedSnapshot> {
        self.session.commit(&mut self.store)
    }

    pub fn cancel_edit(&mut self) {
        self.session.cancel();
    }

    pub fn add_row(&mut self) -> SharedSnapshot {
        self.store.add_row()
    }

    pub fn remove_row(&mut self, row_idx: usize) -> Result<SharedSnapshot, ViewerError> {
        let snapshot = self.store.remove_row(row_idx)?;
        self.session.rebase_after_row_removed(row_idx);
        Ok(snapshot)
    }

    pub fn add_column(&mut self, name: &str) -> Result<SharedSnapshot, ViewerError> {
        Ok(self.store.add_column(name)?)
    }

    /// Also drops any filter or sort on the removed column.
    pub fn remove_column(&mut self, name: &str) -> Result<SharedSnapshot, ViewerError> {
        let snapshot = self.store.remove_column(name)?;
        self.session.cancel_if_column(name);
        self.filters.remove(name);
        if self.sort.as_ref().is_some_and(|sort| sort.column == name) {
            self.sort = None;
        }
        Ok(snapshot)
    }

    /// Moving through history drops any pending edit.
    pub fn undo(&mut self) -> SharedSnapshot {
        let before = self.store.revision();
        let snapshot = self.store.undo();
        if self.store.revision() != before {
            self.session.discard_after_history_move();
        }
        snapshot
    }

    pub fn redo(&mut self) -> SharedSnapshot {
        let before = self.store.revision();
        let snapshot = self.store.redo();
        if self.store.revision() != before {
            self.session.discard_after_history_move();
        }
        snapshot
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.revision() != self.saved_revision
    }

    /// Captures the grid as it is now. Edits made afterwards are not part of this save.
    ///
    /// Saves replace the whole stored file, so a grid loaded from a window that
    /// does not cover every stored row is refused.
    pub fn begin_save(&self) -> Result<PendingSave, ViewerError> {
        if self.is_partial() {
            warn!(
                file = %self.file_id,
                loaded = self.loaded_rows,
                total = self.remote_total_rows,
                "refusing to save a partial window"
            );
            return Err(ViewerError::PartialWindow {
                loaded: self.loaded_rows,
                total: self.remote_total_rows,
            });
        }
        Ok(PendingSave {
            file_id: self.file_id,
            revision: self.store.revision(),
            data: self.current_data(),
        })
    }

    /// True when the loaded window holds fewer rows than the stored file.
    pub fn is_partial(&self) -> bool {
        self.loaded_rows < self.remote_total_rows
    }

    fn current_data(&self) -> TabularData {
        let snapshot = self.store.snapshot();
        TabularData {
            columns: snapshot.columns().to_vec(),
            rows: snapshot.to_value_rows(),
        }
    }

    /// Applies the outcome of a save issued by `begin_save`.
    ///
    /// The unsaved flag is cleared only when the grid has not changed since the
    /// save was issued. A failure leaves edits and the flag as they are.
    pub fn finish_save(
        &mut self,
        pending: PendingSave,
        result: Result<SaveAck, GatewayError>,
    ) -> Result<SaveAck, ViewerError> {
        match result {
            Ok(ack) => {
                if pending.revision == self.store.revision() {
                    self.saved_revision = pending.revision;
                } else {
                    debug!(
                        saved = pending.revision,
                        current = self.store.revision(),
                        "grid changed while saving, keeping unsaved flag"
                    );
                }
                info!(file = %pending.file_id, rows = ack.row_count, "saved");
                Ok(ack)
            }
            Err(err) => {
                warn!(%err, "save failed");
                Err(err.into())
            }
        }
    }

    pub fn save(&mut self) -> Result<SaveAck, ViewerError> {
        let pending = self.begin_save()?;
        let result = self.gateway.save(pending.file_id, &pending.data);
        self.finish_save(pending, result)
    }

    /// Encodes the grid as it is now, unsaved edits included.
    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>, ViewerError> {
        let data = self.current_data();
        Ok(self.gateway.export(self.file_id, &data, format)?)
    }
}
