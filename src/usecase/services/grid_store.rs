use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::grid::{GridSnapshot, Row, SharedSnapshot};
use crate::domain::errors::GridError;
use crate::usecase::services::history::{HistoryCapacity, HistoryManager};

/// Canonical grid state. Every successful mutation pushes exactly one snapshot.
#[derive(Debug, Clone)]
pub struct GridStore {
    history: HistoryManager,
    revision: u64,
}

impl GridStore {
    pub fn new(capacity: HistoryCapacity) -> Self {
        Self {
            history: HistoryManager::empty(capacity),
            revision: 0,
        }
    }

    pub fn with_data(
        columns: Vec<String>,
        rows: Vec<Row>,
        capacity: HistoryCapacity,
    ) -> Result<Self, GridError> {
        let mut store = Self::new(capacity);
        store.initialize(columns, rows)?;
        Ok(store)
    }

    /// Replaces all state and seeds history with the new grid as snapshot 0.
    pub fn initialize(
        &mut self,
        columns: Vec<String>,
        rows: Vec<Row>,
    ) -> Result<SharedSnapshot, GridError> {
        validate_column_names(&columns)?;
        for (idx, row) in rows.iter().enumerate() {
            if !row.matches_columns(&columns) {
                return Err(GridError::InvalidShape { row: idx });
            }
        }

        let rows = rows.iter().map(|row| row.aligned_to(&columns)).collect();
        let snapshot = Arc::new(GridSnapshot::from_parts(columns, rows));
        self.history.reset(snapshot.clone());
        self.revision += 1;
        debug!(
            columns = snapshot.columns().len(),
            rows = snapshot.row_count(),
            "grid initialized"
        );
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> &SharedSnapshot {
        self.history.current()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Changes whenever the current snapshot changes, including undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_cell(
        &mut self,
        row_idx: usize,
        column: &str,
        value: impl Into<String>,
    ) -> Result<SharedSnapshot, GridError> {
        let current = self.snapshot();
        self.check_row(row_idx)?;
        self.check_column(column)?;

        let mut rows = current.rows().to_vec();
        rows[row_idx].set(column, value.into());
        let next = GridSnapshot::from_parts(current.columns().to_vec(), rows);
        debug!(row = row_idx, column, "cell set");
        Ok(self.commit(next))
    }

    pub fn add_row(&mut self) -> SharedSnapshot {
        let current = self.snapshot();
        let mut rows = current.rows().to_vec();
        rows.push(Row::blank(current.columns()));
        let next = GridSnapshot::from_parts(current.columns().to_vec(), rows);
        debug!(rows = next.row_count(), "row added");
        self.commit(next)
    }

    pub fn remove_row(&mut self, row_idx: usize) -> Result<SharedSnapshot, GridError> {
        self.check_row(row_idx)?;
        let current = self.snapshot();
        let mut rows = current.rows().to_vec();
        rows.remove(row_idx);
        let next = GridSnapshot::from_parts(current.columns().to_vec(), rows);
        debug!(row = row_idx, "row removed");
        Ok(self.commit(next))
    }

    pub fn add_column(&mut self, name: &str) -> Result<SharedSnapshot, GridError> {
        let current = self.snapshot();
        if name.is_empty() || current.has_column(name) {
            return Err(GridError::InvalidName(name.to_string()));
        }

        let mut columns = current.columns().to_vec();
        columns.push(name.to_string());
        let rows = current
            .rows()
            .iter()
            .map(|row| row.clone().with(name, ""))
            .collect();
        let next = GridSnapshot::from_parts(columns, rows);
        debug!(column = name, "column added");
        Ok(self.commit(next))
    }

    pub fn remove_column(&mut self, name: &str) -> Result<SharedSnapshot, GridError> {
        self.check_column(name)?;
        let current = self.snapshot();
        let columns = current
            .columns()
            .iter()
            .filter(|column| column.as_str() != name)
            .cloned()
            .collect();
        let rows = current
            .rows()
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.remove(name);
                row
            })
            .collect();
        let next = GridSnapshot::from_parts(columns, rows);
        debug!(column = name, "column removed");
        Ok(self.commit(next))
    }

    pub fn undo(&mut self) -> SharedSnapshot {
        if self.history.can_undo() {
            self.revision += 1;
            debug!(cursor = self.history.cursor() - 1, "undo");
        }
        self.history.undo()
    }

    pub fn redo(&mut self) -> SharedSnapshot {
        if self.history.can_redo() {
            self.revision += 1;
            debug!(cursor = self.history.cursor() + 1, "redo");
        }
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn check_cell(&self, row_idx: usize, column: &str) -> Result<(), GridError> {
        self.check_row(row_idx)?;
        self.check_column(column)
    }

    fn check_row(&self, row_idx: usize) -> Result<(), GridError> {
        let len = self.snapshot().row_count();
        if row_idx >= len {
            return Err(GridError::OutOfRange {
                index: row_idx,
                len,
            });
        }
        Ok(())
    }

    fn check_column(&self, column: &str) -> Result<(), GridError> {
        if !self.snapshot().has_column(column) {
            return Err(GridError::UnknownColumn(column.to_string()));
        }
        Ok(())
    }

    fn commit(&mut self, next: GridSnapshot) -> SharedSnapshot {
        debug_assert!(next
            .rows()
            .iter()
            .all(|row| row.matches_columns(next.columns())));
        self.revision += 1;
        self.history.push(Arc::new(next))
    }
}

fn validate_column_names(columns: &[String]) -> Result<(), GridError> {
    let mut seen = HashSet::new();
    for column in columns {
        if column.is_empty() || !seen.insert(column.as_str()) {
            return Err(GridError::InvalidName(column.clone()));
        }
    }
    Ok(())
}
