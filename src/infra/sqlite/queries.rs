use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::entities::query::FileId;
use crate::infra::sqlite::schema::{init_db, open_connection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetMeta {
    pub id: FileId,
    pub name: String,
    pub row_count: i64,
    pub source_path: String,
    pub imported_at: String,
    pub updated_at: Option<String>,
}

pub fn insert_header_names(
    tx: &rusqlite::Transaction<'_>,
    dataset_id: i64,
    headers: &[String],
) -> Result<()> {
    let mut insert_header = tx
        .prepare("INSERT INTO column_name(dataset_id, col_idx, name) VALUES (?1, ?2, ?3)")
        .context("failed to prepare header insert")?;

    for (col_idx, name) in headers.iter().enumerate() {
        insert_header
            .execute(params![dataset_id, col_idx as i64, name])
            .context("failed to insert header")?;
    }

    Ok(())
}

fn insert_cells(tx: &rusqlite::Transaction<'_>, dataset_id: i64, rows: &[Vec<String>]) -> Result<()> {
    let mut insert_cell = tx
        .prepare("INSERT INTO cell(dataset_id, row_idx, col_idx, value) VALUES (?1, ?2, ?3, ?4)")
        .context("failed to prepare cell insert")?;
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            insert_cell
                .execute(params![dataset_id, row_idx as i64, col_idx as i64, value])
                .context("failed to insert cell")?;
        }
    }
    Ok(())
}

pub fn create_dataset_from_rows(
    db_path: &Path,
    name: &str,
    source_path: &str,
    columns: &[String],
    rows: &[Vec<String>],
) -> Result<i64> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start dataset create transaction")?;

    tx.execute(
        "INSERT INTO dataset(name, source_path, row_count) VALUES (?1, ?2, ?3)",
        params![name, source_path, rows.len() as i64],
    )
    .context("failed to insert dataset")?;
    let dataset_id = tx.last_insert_rowid();

    insert_header_names(&tx, dataset_id, columns)?;
    insert_cells(&tx, dataset_id, rows)?;

    tx.commit().context("failed to commit dataset create")?;
    Ok(dataset_id)
}

fn dataset_row_count(conn: &Connection, dataset_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT row_count FROM dataset WHERE id = ?1",
        [dataset_id],
        |row| row.get::<_, i64>(0),
    )
    .optional()
    .context("failed to query dataset")?
    .with_context(|| format!("dataset #{dataset_id} not found"))
}

fn load_columns(conn: &Connection, dataset_id: i64) -> Result<Vec<String>> {
    let mut columns_stmt = conn
        .prepare(
            "SELECT name
             FROM column_name
             WHERE dataset_id = ?1
             ORDER BY col_idx ASC",
        )
        .context("failed to prepare columns query")?;
    let columns = columns_stmt
        .query_map([dataset_id], |row| row.get::<_, String>(0))
        .context("failed to query columns")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect columns")?;
    Ok(columns)
}

/// Rows `[offset, offset + limit)` in stored order, every row padded to the column count.
fn load_rows(
    conn: &Connection,
    dataset_id: i64,
    column_count: usize,
    offset: i64,
    limit: i64,
) -> Result<Vec<Vec<String>>> {
    let mut rows = vec![vec![String::new(); column_count]; limit.max(0) as usize];
    if rows.is_empty() || column_count == 0 {
        return Ok(rows);
    }

    let mut hydrate_stmt = conn
        .prepare(
            "SELECT row_idx, col_idx, value
             FROM cell
             WHERE dataset_id = ?1 AND row_idx >= ?2 AND row_idx < ?3
             ORDER BY row_idx ASC, col_idx ASC",
        )
        .context("failed to prepare row hydration query")?;
    let mut hydrate_rows = hydrate_stmt
        .query(params![dataset_id, offset, offset.saturating_add(limit)])
        .context("failed to run row hydration query")?;

    while let Some(row) = hydrate_rows.next().context("failed to read hydrated row")? {
        let row_idx: i64 = row.get(0).context("failed to read row_idx")?;
        let col_idx: i64 = row.get(1).context("failed to read col_idx")?;
        let value: String = row.get(2).context("failed to read value")?;

        if let Some(dest_cell) = rows
            .get_mut((row_idx - offset) as usize)
            .and_then(|dest_row| dest_row.get_mut(col_idx as usize))
        {
            *dest_cell = value;
        }
    }

    Ok(rows)
}

/// One 1-based page of stored rows plus the dataset's total row count.
pub fn query_page(
    db_path: &Path,
    dataset_id: i64,
    page: usize,
    page_size: usize,
) -> Result<(Vec<String>, Vec<Vec<String>>, i64)> {
    if page_size == 0 {
        anyhow::bail!("page_size must be greater than zero")
    }

    let conn = open_connection(db_path)?;
    let total_rows = dataset_row_count(&conn, dataset_id)?;
    let columns = load_columns(&conn, dataset_id)?;

    let page_size = i64::try_from(page_size).unwrap_or(i64::MAX);
    let page_idx = i64::try_from(page.max(1) - 1).unwrap_or(i64::MAX);
    let offset = page_idx.saturating_mul(page_size);
    let limit = total_rows.saturating_sub(offset).clamp(0, page_size);

    let rows = load_rows(&conn, dataset_id, columns.len(), offset, limit)?;
    Ok((columns, rows, total_rows))
}

pub fn load_dataset(db_path: &Path, dataset_id: i64) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let conn = open_connection(db_path)?;
    let total_rows = dataset_row_count(&conn, dataset_id)?;
    let columns = load_columns(&conn, dataset_id)?;
    let rows = load_rows(&conn, dataset_id, columns.len(), 0, total_rows)?;
    Ok((columns, rows))
}

/// Replaces columns and cells of an existing dataset in one transaction.
pub fn replace_dataset(
    db_path: &Path,
    dataset_id: i64,
    columns: &[String],
    rows: &[Vec<String>],
    updated_at: &str,
) -> Result<usize> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start update transaction")?;

    let updated = tx
        .execute(
            "UPDATE dataset SET row_count = ?1, updated_at = ?2 WHERE id = ?3",
            params![rows.len() as i64, updated_at, dataset_id],
        )
        .context("failed to update dataset row_count")?;
    if updated == 0 {
        anyhow::bail!("dataset #{dataset_id} not found")
    }

    tx.execute("DELETE FROM cell WHERE dataset_id = ?1", params![dataset_id])
        .context("failed to clear existing cells")?;
    tx.execute(
        "DELETE FROM column_name WHERE dataset_id = ?1",
        params![dataset_id],
    )
    .context("failed to clear existing columns")?;

    insert_header_names(&tx, dataset_id, columns)?;
    insert_cells(&tx, dataset_id, rows)?;

    tx.commit().context("failed to commit dataset update")?;
    Ok(rows.len())
}

pub fn list_datasets(db_path: &Path) -> Result<Vec<DatasetMeta>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, name, row_count, source_path, imported_at, updated_at
             FROM dataset
             ORDER BY id DESC",
        )
        .context("failed to prepare datasets query")?;

    let datasets = stmt
        .query_map([], |row| {
            Ok(DatasetMeta {
                id: row.get::<_, i64>(0)?.into(),
                name: row.get(1)?,
                row_count: row.get(2)?,
                source_path: row.get(3)?,
                imported_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        })
        .context("failed to query datasets")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect datasets")?;

    Ok(datasets)
}
