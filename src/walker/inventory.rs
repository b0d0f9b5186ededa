//! Output rows collected by the walker

use serde::Serialize;

/// Column names, in output order
pub const REPORT_COLUMNS: [&str; 5] = ["id", "name", "path", "owner", "writers"];

/// One file in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,

    /// Path of the containing folder relative to the walk root
    pub path: String,

    pub owner: String,

    /// Comma-joined writer display strings
    pub writers: String,
}

/// Files in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    records: Vec<FileRecord>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: FileRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<FileRecord> {
        self.records
    }

    /// Order by containing path, then file name (stable for equal keys)
    pub fn sort_by_path(&mut self) {
        self.records
            .sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.name.cmp(&b.name)));
    }
}

impl From<Vec<FileRecord>> for Inventory {
    fn from(records: Vec<FileRecord>) -> Self {
        Self { records }
    }
}

impl IntoIterator for Inventory {
    type Item = FileRecord;
    type IntoIter = std::vec::IntoIter<FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
