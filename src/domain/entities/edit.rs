#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub row_idx: usize,
    pub column: String,
}

impl CellKey {
    pub fn new(row_idx: usize, column: impl Into<String>) -> Self {
        Self {
            row_idx,
            column: column.into(),
        }
    }
}

/// The single in-progress cell edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub target: CellKey,
    pub pending_value: String,
}
