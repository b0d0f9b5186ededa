//! CSV report writer

use crate::error::{ReportError, ReportResult};
use crate::report::{ReportContext, ReportWriter};
use crate::walker::{Inventory, REPORT_COLUMNS};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Writes the inventory as CSV with a header row
pub struct CsvReport<W: Write> {
    writer: ::csv::Writer<W>,
}

impl<W: Write> CsvReport<W> {
    pub fn new(inner: W) -> Self {
        // Header is written by hand so an empty inventory still gets one
        let writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> ReportResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| io::Error::new(e.error().kind(), e.error().to_string()).into())
    }
}

impl CsvReport<BufWriter<File>> {
    /// Create (or truncate) a CSV file
    pub fn create(path: &Path) -> ReportResult<Self> {
        let file = File::create(path).map_err(|e| ReportError::CreateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl CsvReport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportWriter for CsvReport<W> {
    fn write_report(
        &mut self,
        inventory: &Inventory,
        context: &ReportContext<'_>,
    ) -> ReportResult<()> {
        self.writer.write_record(REPORT_COLUMNS)?;
        for record in inventory {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;

        debug!(root = %context.root, rows = inventory.len(), "Wrote CSV report");
        Ok(())
    }
}
