use thiserror::Error;

/// Validation failures raised by `GridStore`. State is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("row {row} does not match the grid columns")]
    InvalidShape { row: usize },
    #[error("row index {index} out of range (rows: {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("invalid column name: {0:?}")]
    InvalidName(String),
}
