//! Folder worklist with pop-time deduplication
//!
//! The worklist is a plain LIFO stack. A folder id is marked visited when
//! it is popped, not when it is pushed, so the same folder may sit in the
//! stack several times but is only ever handed out once.

use crate::drive::types::FolderId;
use std::collections::HashSet;
use tracing::debug;

/// A folder waiting to be expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklistEntry {
    /// Folder to list
    pub folder_id: FolderId,

    /// Slash-joined folder names from the root ("" for the root itself)
    pub path: String,
}

impl WorklistEntry {
    /// Create the root entry
    pub fn root(folder_id: FolderId) -> Self {
        Self {
            folder_id,
            path: String::new(),
        }
    }

    /// Create the entry for a subfolder discovered under this one
    pub fn child(&self, folder_id: FolderId, name: &str) -> Self {
        Self {
            folder_id,
            path: format!("{}/{}", self.path, name),
        }
    }
}

/// Stack of pending folders plus the set already expanded
#[derive(Debug, Default)]
pub struct Worklist {
    stack: Vec<WorklistEntry>,
    visited: HashSet<FolderId>,
    duplicates: u64,
}

impl Worklist {
    /// Create a worklist seeded with the root folder
    pub fn new(root: FolderId) -> Self {
        let mut worklist = Self::default();
        worklist.push(WorklistEntry::root(root));
        worklist
    }

    /// Add a folder to the stack
    pub fn push(&mut self, entry: WorklistEntry) {
        self.stack.push(entry);
    }

    /// Pop the most recently pushed folder not yet visited, marking it visited
    pub fn next_unvisited(&mut self) -> Option<WorklistEntry> {
        while let Some(entry) = self.stack.pop() {
            if self.visited.insert(entry.folder_id.clone()) {
                return Some(entry);
            }
            debug!(folder = %entry.folder_id, path = %entry.path, "Skipping already visited folder");
            self.duplicates += 1;
        }
        None
    }

    /// Number of folders handed out so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of entries still on the stack (duplicates included)
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Number of popped entries discarded as already visited
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }
}
