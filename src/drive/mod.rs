//! Google Drive access module
//!
//! Provides the listing seam the walker consumes and a blocking HTTP
//! implementation of it against the Drive v3 REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  DirectoryListing                    │
//! │  - One page of children per call                    │
//! │  - Continuation token in, continuation token out    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                    DriveClient                       │
//! │  - reqwest blocking client, bearer token            │
//! │  - files.list with "'<id>' in parents"              │
//! │  - Fixed-count retry of transient failures          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use drive_perm_walker::drive::{DirectoryListing, DriveClientBuilder, FolderId};
//! use std::time::Duration;
//!
//! let client = DriveClientBuilder::new("ya29.token")
//!     .timeout(Duration::from_secs(30))
//!     .page_size(100)
//!     .build()
//!     .unwrap();
//!
//! let page = client.list_page(&FolderId::from("root-folder-id"), None).unwrap();
//! for file in &page.files {
//!     println!("{} {}", file.id, file.name);
//! }
//! ```

pub mod auth;
pub mod client;
pub mod consent;
pub mod types;

pub use auth::{resolve_access_token, StoredCredentials};
pub use client::{DriveClient, DriveClientBuilder, DEFAULT_BASE_URL};
pub use consent::ClientSecrets;
pub use types::{FileListPage, FolderId, RemoteFile, RemotePermission, MIME_TYPE_FOLDER};

use crate::error::DriveResult;

/// A paginated source of folder children
///
/// Implementations return one page per call. The caller passes back the
/// `next_page_token` of the previous page until it comes back `None`.
pub trait DirectoryListing {
    /// Fetch one page of the children of `folder_id`
    fn list_page(&self, folder_id: &FolderId, page_token: Option<&str>)
        -> DriveResult<FileListPage>;
}

impl<T: DirectoryListing + ?Sized> DirectoryListing for &T {
    fn list_page(
        &self,
        folder_id: &FolderId,
        page_token: Option<&str>,
    ) -> DriveResult<FileListPage> {
        (**self).list_page(folder_id, page_token)
    }
}
