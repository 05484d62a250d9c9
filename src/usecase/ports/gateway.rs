use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::entities::query::FileId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("failed to load {file_id}: {message}")]
    LoadFailure { file_id: FileId, message: String },
    #[error("failed to save {file_id}: {message}")]
    SaveFailure { file_id: FileId, message: String },
    #[error("failed to export {file_id}: {message}")]
    ExportFailure { file_id: FileId, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "xlsx" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TabularData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One remote page of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadedPage {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAck {
    pub row_count: usize,
    pub saved_at: DateTime<Utc>,
}

/// Storage behind the viewer. `page` is 1-based.
pub trait PersistenceGateway: Send + Sync {
    fn load(
        &self,
        file_id: FileId,
        page: usize,
        page_size: NonZeroUsize,
    ) -> Result<LoadedPage, GatewayError>;

    /// Full-replace write of `data`.
    fn save(&self, file_id: FileId, data: &TabularData) -> Result<SaveAck, GatewayError>;

    /// Encodes `data` as `format`. Nothing is read back from storage.
    fn export(
        &self,
        file_id: FileId,
        data: &TabularData,
        format: ExportFormat,
    ) -> Result<Vec<u8>, GatewayError>;
}
