use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::infra::import::{fit_row, normalize_headers, ImportResult};
use crate::infra::sqlite::queries::create_dataset_from_rows;

pub fn import_csv_to_sqlite(db_path: &Path, csv_path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let raw_headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .clone();

    if raw_headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let raw_headers: Vec<&str> = raw_headers.iter().collect();
    let headers = normalize_headers(raw_headers.as_slice());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let values = record.iter().map(str::to_string).collect();
        rows.push(fit_row(values, headers.len()));
    }

    let source_path = csv_path.to_string_lossy().into_owned();
    let dataset_name = csv_path
        .file_stem()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("dataset")
        .to_string();

    let dataset_id =
        create_dataset_from_rows(db_path, &dataset_name, &source_path, &headers, &rows)?;
    info!(dataset_id, rows = rows.len(), path = %csv_path.display(), "imported csv");

    Ok(ImportResult {
        dataset_id: dataset_id.into(),
        name: dataset_name,
        row_count: rows.len() as i64,
    })
}
