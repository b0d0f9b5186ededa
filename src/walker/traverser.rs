//! Sequential folder traversal
//!
//! Pops one folder at a time off the worklist, lists all of its children
//! (every page), pushes subfolders back onto the worklist and records every
//! other child with its owner and writers. A fixed pause follows each
//! folder so the service sees a steady, modest request rate.
//!
//! Any listing or normalization failure ends the walk.

use crate::drive::types::{FolderId, RemoteFile};
use crate::drive::DirectoryListing;
use crate::error::{DriveError, DriveResult, Result, WalkerError};
use crate::permissions::derive_owner_and_writers;
use crate::walker::inventory::{FileRecord, Inventory};
use crate::walker::worklist::{Worklist, WorklistEntry};
use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Pause between folder expansions
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(125);

/// Snapshot handed to the progress callback after each folder is popped
#[derive(Debug, Clone)]
pub struct WalkProgress {
    /// Folders popped so far, including the current one
    pub folders: u64,

    /// Files recorded so far
    pub files: u64,

    /// Entries still on the worklist
    pub pending: usize,

    /// Folder about to be listed
    pub current_folder: FolderId,

    /// Path of the folder about to be listed
    pub current_path: String,

    pub elapsed: Duration,
}

/// Counters for a finished walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub folders: u64,
    pub files: u64,

    /// Listing requests issued (one per page)
    pub pages: u64,

    /// Worklist entries discarded because the folder was already expanded
    pub duplicates: u64,

    pub duration: Duration,
}

/// Inventory plus counters
#[derive(Debug, Clone)]
pub struct WalkResult {
    pub inventory: Inventory,
    pub stats: WalkStats,
}

/// Walks a folder tree through a [`DirectoryListing`]
pub struct Traverser<L> {
    listing: L,
    request_delay: Duration,
}

impl<L: DirectoryListing> Traverser<L> {
    pub fn new(listing: L) -> Self {
        Self {
            listing,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }

    /// Set the fixed pause between folder expansions
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Walk everything below `root` and return the files found
    pub fn traverse(&self, root: &FolderId) -> Result<Inventory> {
        self.walk(root, |_| {}).map(|result| result.inventory)
    }

    /// Walk everything below `root`, reporting progress after each pop
    pub fn walk<F>(&self, root: &FolderId, mut on_progress: F) -> Result<WalkResult>
    where
        F: FnMut(&WalkProgress),
    {
        let start = Instant::now();
        let mut worklist = Worklist::new(root.clone());
        let mut inventory = Inventory::new();
        let mut pages = 0u64;

        info!(root = %root, "Starting walk");

        while let Some(entry) = worklist.next_unvisited() {
            on_progress(&WalkProgress {
                folders: worklist.visited_count() as u64,
                files: inventory.len() as u64,
                pending: worklist.pending(),
                current_folder: entry.folder_id.clone(),
                current_path: entry.path.clone(),
                elapsed: start.elapsed(),
            });

            let children = self.list_children(&entry.folder_id, &mut pages)?;
            debug!(
                folder = %entry.folder_id,
                path = %entry.path,
                children = children.len(),
                "Listed folder"
            );

            for child in children {
                if child.is_folder() {
                    let sub = entry.child(FolderId::new(child.id), &child.name);
                    worklist.push(sub);
                } else {
                    inventory.push(file_record(&entry, child)?);
                }
            }

            if !worklist.is_empty() && !self.request_delay.is_zero() {
                thread::sleep(self.request_delay);
            }
        }

        let stats = WalkStats {
            folders: worklist.visited_count() as u64,
            files: inventory.len() as u64,
            pages,
            duplicates: worklist.duplicates(),
            duration: start.elapsed(),
        };

        info!(
            folders = stats.folders,
            files = stats.files,
            pages = stats.pages,
            "Walk finished"
        );

        Ok(WalkResult { inventory, stats })
    }

    /// List every child of a folder, following continuation tokens
    fn list_children(&self, folder_id: &FolderId, pages: &mut u64) -> DriveResult<Vec<RemoteFile>> {
        let mut children = Vec::new();
        let mut page_token: Option<String> = None;
        let mut sent_tokens = HashSet::new();

        loop {
            let page = self.listing.list_page(folder_id, page_token.as_deref())?;
            *pages += 1;
            children.extend(page.files);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) if !sent_tokens.insert(next.clone()) => {
                    return Err(DriveError::Decode {
                        folder_id: folder_id.to_string(),
                        reason: format!("page token '{}' returned twice", next),
                    });
                }
                Some(next) => page_token = Some(next),
                None => return Ok(children),
            }
        }
    }
}

fn file_record(folder: &WorklistEntry, file: RemoteFile) -> Result<FileRecord> {
    let (owner, writers) = derive_owner_and_writers(file.permissions.as_deref()).map_err(|source| {
        WalkerError::FilePermission {
            file_id: file.id.clone(),
            path: format!("{}/{}", folder.path, file.name),
            source,
        }
    })?;

    Ok(FileRecord {
        id: file.id,
        name: file.name,
        path: folder.path.clone(),
        owner,
        writers,
    })
}
