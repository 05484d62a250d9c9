use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::infra::import::csv::import_csv_to_sqlite;
use crate::infra::import::xlsx::{import_xlsx_sheets_to_sqlite, list_sheets};
use crate::infra::import::ImportResult;
use crate::infra::sqlite::queries::{list_datasets, DatasetMeta};

pub struct ImportService {
    db_path: PathBuf,
}

impl ImportService {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Picks the importer from the file extension. `sheets` only applies to workbooks.
    pub fn import_file(&self, path: &Path, sheets: &[String]) -> Result<Vec<ImportResult>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => self.import_xlsx(path, sheets),
            "csv" | "txt" => Ok(vec![self.import_csv(path)?]),
            other => bail!("unsupported file type: {other:?}"),
        }
    }

    pub fn import_csv(&self, path: &Path) -> Result<ImportResult> {
        import_csv_to_sqlite(&self.db_path, path)
    }

    pub fn import_xlsx(&self, path: &Path, sheets: &[String]) -> Result<Vec<ImportResult>> {
        import_xlsx_sheets_to_sqlite(&self.db_path, path, sheets)
    }

    pub fn sheet_names(&self, path: &Path) -> Result<Vec<String>> {
        list_sheets(path)
    }

    pub fn list_datasets(&self) -> Result<Vec<DatasetMeta>> {
        list_datasets(&self.db_path)
    }
}
