//! SQLite report writer
//!
//! Stores one row per file in `files` and walk metadata in `walk_info`.
//! Rerunning against the same database replaces the previous report.

use crate::error::{ReportError, ReportResult};
use crate::report::{ReportContext, ReportWriter};
use crate::walker::Inventory;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};

/// Current schema version
pub const SCHEMA_VERSION: u32 = 1;

/// `row` is the key since Drive may list the same file under several folders
const CREATE_FILES_TABLE: &str = r#"
CREATE TABLE files (
    row INTEGER PRIMARY KEY,
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    path TEXT NOT NULL,
    owner TEXT NOT NULL,
    writers TEXT NOT NULL
)
"#;

const CREATE_WALK_INFO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS walk_info (
    key TEXT PRIMARY KEY,
    value TEXT
)
"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_files_id ON files(id)",
    "CREATE INDEX IF NOT EXISTS idx_files_path ON files(path)",
    "CREATE INDEX IF NOT EXISTS idx_files_owner ON files(owner)",
];

const WRITE_PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA temp_store = MEMORY;
"#;

/// Metadata keys in `walk_info`
pub mod keys {
    /// Folder id the walk started from
    pub const ROOT_FOLDER_ID: &str = "root_folder_id";

    /// Timestamp when walk started (RFC 3339)
    pub const START_TIME: &str = "start_time";

    /// Timestamp when the report was written (RFC 3339)
    pub const END_TIME: &str = "end_time";

    pub const DURATION_SECS: &str = "duration_secs";

    pub const TOTAL_FOLDERS: &str = "total_folders";

    pub const TOTAL_FILES: &str = "total_files";

    /// Listing requests issued
    pub const TOTAL_PAGES: &str = "total_pages";

    pub const SCHEMA_VERSION: &str = "schema_version";

    pub const WALKER_VERSION: &str = "walker_version";
}

/// Create a fresh report schema, dropping any previous report
pub fn create_schema(conn: &Connection) -> ReportResult<()> {
    conn.execute_batch(WRITE_PRAGMAS)?;
    conn.execute("DROP TABLE IF EXISTS files", [])?;
    conn.execute("DROP TABLE IF EXISTS walk_info", [])?;
    conn.execute(CREATE_FILES_TABLE, [])?;
    conn.execute(CREATE_WALK_INFO_TABLE, [])?;
    Ok(())
}

/// Create indexes (after the rows are in)
pub fn create_indexes(conn: &Connection) -> ReportResult<()> {
    for sql in CREATE_INDEXES {
        conn.execute(sql, [])?;
    }
    Ok(())
}

/// Store walk metadata
pub fn set_walk_info(conn: &Connection, key: &str, value: &str) -> ReportResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO walk_info (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

/// Get walk metadata
pub fn get_walk_info(conn: &Connection, key: &str) -> ReportResult<Option<String>> {
    let result = conn.query_row(
        "SELECT value FROM walk_info WHERE key = ?1",
        [key],
        |row| row.get(0),
    );

    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Writes the inventory into a SQLite database
pub struct SqliteReport {
    conn: Connection,
}

impl SqliteReport {
    /// Open (or create) the database at `path`
    pub fn create(path: &Path) -> ReportResult<Self> {
        info!("Opening database: {}", path.display());
        let conn = Connection::open(path).map_err(|e| ReportError::CreateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { conn })
    }

    fn write_info(&self, context: &ReportContext<'_>) -> ReportResult<()> {
        let stats = context.stats;
        let entries = [
            (keys::ROOT_FOLDER_ID, context.root.to_string()),
            (keys::START_TIME, context.started_at.to_rfc3339()),
            (keys::END_TIME, Utc::now().to_rfc3339()),
            (keys::DURATION_SECS, format!("{:.3}", stats.duration.as_secs_f64())),
            (keys::TOTAL_FOLDERS, stats.folders.to_string()),
            (keys::TOTAL_FILES, stats.files.to_string()),
            (keys::TOTAL_PAGES, stats.pages.to_string()),
            (keys::SCHEMA_VERSION, SCHEMA_VERSION.to_string()),
            (keys::WALKER_VERSION, env!("CARGO_PKG_VERSION").to_string()),
        ];

        for (key, value) in entries {
            set_walk_info(&self.conn, key, &value)?;
        }
        Ok(())
    }
}

impl ReportWriter for SqliteReport {
    fn write_report(
        &mut self,
        inventory: &Inventory,
        context: &ReportContext<'_>,
    ) -> ReportResult<()> {
        create_schema(&self.conn)?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO files (id, name, path, owner, writers) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in inventory {
                stmt.execute(params![
                    record.id,
                    record.name,
                    record.path,
                    record.owner,
                    record.writers
                ])?;
            }
        }
        tx.commit()?;

        create_indexes(&self.conn)?;
        self.write_info(context)?;

        debug!(root = %context.root, rows = inventory.len(), "Wrote SQLite report");
        Ok(())
    }
}
