use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Bumped whenever the table layout below changes.
pub const SCHEMA_VERSION: i64 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.pragma_update(None, "foreign_keys", true)
        .context("failed to enable foreign key enforcement")?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    Ok(conn)
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("failed to read schema version")
}

/// Creates the dataset tables. Column names and cells belong to their dataset
/// and go with it; a save replaces both sets wholesale.
pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;
    let found = schema_version(&conn)?;
    if found > SCHEMA_VERSION {
        bail!(
            "{} uses schema version {found}, newer than supported version {SCHEMA_VERSION}",
            db_path.display()
        );
    }

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS dataset (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            source_path TEXT NOT NULL,
            row_count   INTEGER NOT NULL CHECK (row_count >= 0),
            imported_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at  TEXT
        );

        CREATE TABLE IF NOT EXISTS column_name (
            dataset_id  INTEGER NOT NULL REFERENCES dataset(id) ON DELETE CASCADE,
            col_idx     INTEGER NOT NULL CHECK (col_idx >= 0),
            name        TEXT NOT NULL CHECK (name <> ''),
            PRIMARY KEY (dataset_id, col_idx),
            UNIQUE (dataset_id, name)
        );

        CREATE TABLE IF NOT EXISTS cell (
            dataset_id  INTEGER NOT NULL REFERENCES dataset(id) ON DELETE CASCADE,
            row_idx     INTEGER NOT NULL CHECK (row_idx >= 0),
            col_idx     INTEGER NOT NULL CHECK (col_idx >= 0),
            value       TEXT NOT NULL,
            PRIMARY KEY (dataset_id, row_idx, col_idx)
        ) WITHOUT ROWID;
        ",
    )
    .context("failed to initialize schema")?;

    if found < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .context("failed to record schema version")?;
    }

    Ok(())
}
