use std::sync::Arc;

/// One grid row: an ordered column-name → value mapping.
///
/// Every row of a grid carries exactly the grid's column names as keys. The
/// store keeps entries in column order, so structural equality of two rows of
/// the same grid is key-set equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs each column with the value at the same position; missing values become `""`.
    pub fn from_values<S: AsRef<str>>(columns: &[String], values: &[S]) -> Self {
        let cells = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let value = values.get(idx).map(|v| v.as_ref()).unwrap_or("");
                (column.clone(), value.to_string())
            })
            .collect();
        Self { cells }
    }

    pub fn blank(columns: &[String]) -> Self {
        Self::from_values::<&str>(columns, &[])
    }

    /// Insert or overwrite `column`, keeping the original position of an existing key.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.cells.iter().any(|(name, _)| name == column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns `false` when `column` is not a key of this row.
    pub(crate) fn set(&mut self, column: &str, value: String) -> bool {
        match self.cells.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn insert(&mut self, column: String, value: String) {
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    pub(crate) fn remove(&mut self, column: &str) -> Option<String> {
        let idx = self.cells.iter().position(|(name, _)| name == column)?;
        Some(self.cells.remove(idx).1)
    }

    /// Key-set equality against `columns`, independent of storage order.
    pub fn matches_columns(&self, columns: &[String]) -> bool {
        self.cells.len() == columns.len()
            && columns.iter().all(|column| self.contains_column(column))
    }

    /// Reorders entries to follow `columns`. Callers must check `matches_columns` first.
    pub(crate) fn aligned_to(&self, columns: &[String]) -> Row {
        let cells = columns
            .iter()
            .map(|column| {
                let value = self.get(column).unwrap_or("").to_string();
                (column.clone(), value)
            })
            .collect();
        Row { cells }
    }

    pub fn into_values(self) -> Vec<String> {
        self.cells.into_iter().map(|(_, value)| value).collect()
    }
}

/// Immutable value of the whole grid at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridSnapshot {
    columns: Vec<String>,
    rows: Vec<Row>,
}

pub type SharedSnapshot = Arc<GridSnapshot>;

impl GridSnapshot {
    /// Builds a snapshot without validation; `GridStore` is the only producer
    /// of snapshots that enter history.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, row_idx: usize) -> Option<&Row> {
        self.rows.get(row_idx)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    pub fn cell(&self, row_idx: usize, column: &str) -> Option<&str> {
        self.rows.get(row_idx).and_then(|row| row.get(column))
    }

    /// Row values in column order.
    pub fn row_values(&self, row_idx: usize) -> Option<Vec<String>> {
        let row = self.rows.get(row_idx)?;
        Some(
            self.columns
                .iter()
                .map(|column| row.get(column).unwrap_or("").to_string())
                .collect(),
        )
    }

    pub fn to_value_rows(&self) -> Vec<Vec<String>> {
        (0..self.rows.len())
            .filter_map(|row_idx| self.row_values(row_idx))
            .collect()
    }
}
