//! Report output
//!
//! The walker hands over a finished [`Inventory`]; a [`ReportWriter`]
//! serializes it. Two formats are supported:
//! - CSV: header `id,name,path,owner,writers`, one row per file, written to
//!   a file or stdout
//! - SQLite: a `files` table plus `walk_info` metadata, for ad-hoc queries
//!   over large trees
//!
//! ```text
//!   Inventory ──► ReportWriter ──┬──► CsvReport<W: Write>
//!                                └──► SqliteReport (rusqlite)
//! ```

pub mod csv;
pub mod sqlite;

pub use self::csv::CsvReport;
pub use self::sqlite::SqliteReport;

use crate::drive::types::FolderId;
use crate::error::ReportResult;
use crate::walker::{Inventory, WalkStats};
use chrono::{DateTime, Utc};

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values
    Csv,
    /// SQLite database
    Sqlite,
}

/// Facts about the walk stored next to the rows where the format allows
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub root: &'a FolderId,
    pub stats: &'a WalkStats,
    pub started_at: DateTime<Utc>,
}

/// Sink for a finished inventory
pub trait ReportWriter {
    /// Write every record, then flush
    fn write_report(&mut self, inventory: &Inventory, context: &ReportContext<'_>)
        -> ReportResult<()>;
}
