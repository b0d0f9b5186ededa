//! Drive API wire types
//!
//! These mirror the subset of the Drive v3 `files.list` response the walker
//! asks for: `nextPageToken, files(id, name, mimeType, permissions)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME type Drive assigns to folders
pub const MIME_TYPE_FOLDER: &str = "application/vnd.google-apps.folder";

/// Read-only metadata scope; enough to list files and their permissions
pub const DRIVE_METADATA_SCOPE: &str = "https://www.googleapis.com/auth/drive.metadata.readonly";

/// Opaque identifier of a Drive folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FolderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FolderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A permission entry as reported by Drive
///
/// Which optional fields are present depends on `kind`: user and group
/// grantees carry `display_name` and `email_address`, domain grantees carry
/// `domain`, and `anyone` carries neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePermission {
    #[serde(default)]
    pub id: Option<String>,

    /// Grantee type (`user`, `group`, `domain`, `anyone`)
    #[serde(rename = "type")]
    pub kind: String,

    /// Role (`owner`, `organizer`, `fileOrganizer`, `writer`, `commenter`, `reader`)
    pub role: String,

    #[serde(default)]
    pub email_address: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,
}

/// A child of a folder as reported by Drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,

    /// Absent when the caller cannot see the sharing settings
    #[serde(default)]
    pub permissions: Option<Vec<RemotePermission>>,
}

impl RemoteFile {
    /// Check if this child is a folder (to be walked, not recorded)
    pub fn is_folder(&self) -> bool {
        self.mime_type == MIME_TYPE_FOLDER
    }
}

/// One page of a `files.list` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListPage {
    #[serde(default)]
    pub files: Vec<RemoteFile>,

    /// Continuation token; `None` on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Error body Drive returns alongside non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
}
