//! drive-perm-walker - Google Drive Sharing Permission Exporter
//!
//! Walks a Google Drive folder tree from a given root, enumerates every file
//! beneath it, and records each file's owner and writers in a report. Meant
//! for administrators auditing who can change what across a drive tree.
//!
//! # Features
//!
//! - **Complete Walk**: Every folder reachable from the root is listed
//!   exactly once, across all result pages.
//!
//! - **Uniform Grantees**: Users, groups, domains and link sharing are
//!   rendered into one display format.
//!
//! - **Polite Pace**: One request at a time with a fixed pause between
//!   folders.
//!
//! - **CSV or SQLite Output**: CSV to a file or stdout, or a SQLite
//!   database for querying large trees.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Google Drive API v3                          │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ files.list ('<id>' in parents)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Traverser                                │
//! │   ┌───────────────┐    ┌──────────────────┐                     │
//! │   │   Worklist    │◄──►│  page follower   │                     │
//! │   │ stack+visited │    │  (nextPageToken) │                     │
//! │   └───────────────┘    └────────┬─────────┘                     │
//! │                                 │ files                          │
//! │                                 ▼                                │
//! │                    ┌──────────────────────────┐                  │
//! │                    │  Permission normalizer   │                  │
//! │                    │  owner / writers strings │                  │
//! │                    └────────────┬─────────────┘                  │
//! │                                 ▼                                │
//! │                          Inventory                               │
//! └─────────────────────────────────┬───────────────────────────────┘
//!                                   ▼
//!                     ┌──────────────────────────┐
//!                     │  CSV / SQLite report     │
//!                     └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # CSV to stdout
//! drive-perm-walker 1AbCdEfGhIjKlMnOp > perms.csv
//!
//! # SQLite, sorted, from a shared drive folder
//! drive-perm-walker https://drive.google.com/drive/folders/1AbC -f sqlite -o perms.db --sort --shared-drives
//!
//! # Query results
//! sqlite3 perms.db "SELECT path, name FROM files WHERE writers LIKE '%[Anyone with link]%'"
//! ```

pub mod config;
pub mod drive;
pub mod error;
pub mod permissions;
pub mod progress;
pub mod report;
pub mod walker;

pub use config::{CliArgs, ReportTarget, WalkConfig};
pub use drive::{DirectoryListing, DriveClient, DriveClientBuilder, FolderId};
pub use error::{Result, WalkerError};
pub use permissions::derive_owner_and_writers;
pub use report::{OutputFormat, ReportWriter};
pub use walker::{FileRecord, Inventory, Traverser, WalkResult, WalkStats};
