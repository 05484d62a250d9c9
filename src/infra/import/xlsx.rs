use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use tracing::{info, warn};

use crate::infra::import::{fit_row, normalize_headers, ImportResult};
use crate::infra::sqlite::queries::create_dataset_from_rows;

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

pub fn list_sheets(xlsx_path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open xlsx: {}", xlsx_path.display()))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Imports each selected sheet (all sheets when `sheets` is empty) as its own dataset.
/// The first row of a sheet is its header row; sheets without one are skipped.
pub fn import_xlsx_sheets_to_sqlite(
    db_path: &Path,
    xlsx_path: &Path,
    sheets: &[String],
) -> Result<Vec<ImportResult>> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open xlsx: {}", xlsx_path.display()))?;
    let source_path = xlsx_path.to_string_lossy().into_owned();

    let selected: Vec<String> = if sheets.is_empty() {
        workbook.sheet_names().to_vec()
    } else {
        sheets.to_vec()
    };

    let mut imported = Vec::new();
    for sheet_name in selected {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

        let mut sheet_rows = range
            .rows()
            .map(|r| r.iter().map(cell_to_string).collect::<Vec<String>>());
        let Some(raw_headers) = sheet_rows.next() else {
            warn!(sheet = %sheet_name, "skipping empty sheet");
            continue;
        };

        let headers = normalize_headers(raw_headers.as_slice());
        let rows: Vec<Vec<String>> = sheet_rows
            .map(|row| fit_row(row, headers.len()))
            .collect();

        let dataset_id = create_dataset_from_rows(
            db_path,
            &sheet_name,
            &format!("{source_path}#{sheet_name}"),
            &headers,
            &rows,
        )
        .with_context(|| format!("failed to store sheet: {sheet_name}"))?;
        info!(dataset_id, sheet = %sheet_name, rows = rows.len(), "imported xlsx sheet");

        imported.push(ImportResult {
            dataset_id: dataset_id.into(),
            name: sheet_name,
            row_count: rows.len() as i64,
        });
    }

    Ok(imported)
}
