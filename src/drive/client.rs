//! Blocking Drive v3 client
//!
//! Issues `files.list` requests for the children of one folder at a time.
//! Each call returns a single page; following `nextPageToken` is the
//! walker's job.

use crate::drive::types::{ApiErrorBody, FileListPage, FolderId};
use crate::drive::DirectoryListing;
use crate::error::{DriveError, DriveResult};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Drive v3 REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Partial response selector for `files.list`
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, permissions)";

/// Drive accepts at most this many results per page
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Drive client bound to one access token
pub struct DriveClient {
    http: Client,
    base_url: String,
    access_token: String,
    page_size: u32,
    shared_drives: bool,
    retries: u32,
    retry_delay: Duration,
}

impl DriveClient {
    /// Create a client with default settings
    pub fn new(access_token: impl Into<String>) -> DriveResult<Self> {
        DriveClientBuilder::new(access_token).build()
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.base_url.trim_end_matches('/'))
    }

    /// Query parameters for one `files.list` call
    pub(crate) fn list_query(
        &self,
        folder_id: &FolderId,
        page_token: Option<&str>,
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("q", format!("'{}' in parents", escape_query_value(folder_id.as_str()))),
            ("fields", LIST_FIELDS.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];

        if self.shared_drives {
            query.push(("supportsAllDrives", "true".to_string()));
            query.push(("includeItemsFromAllDrives", "true".to_string()));
        }

        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        query
    }

    fn fetch_page(
        &self,
        folder_id: &FolderId,
        page_token: Option<&str>,
        attempt: u32,
    ) -> DriveResult<FileListPage> {
        let response = self
            .http
            .get(self.files_url())
            .bearer_auth(&self.access_token)
            .query(&self.list_query(folder_id, page_token))
            .send()
            .map_err(|e| transport_error(folder_id, &e, attempt))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<FileListPage>()
                .map_err(|e| DriveError::Decode {
                    folder_id: folder_id.to_string(),
                    reason: e.to_string(),
                });
        }

        let body = response.text().unwrap_or_default();
        Err(status_error(folder_id, status, &body))
    }
}

impl DirectoryListing for DriveClient {
    fn list_page(
        &self,
        folder_id: &FolderId,
        page_token: Option<&str>,
    ) -> DriveResult<FileListPage> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_page(folder_id, page_token, attempt) {
                Ok(page) => {
                    debug!(
                        folder = %folder_id,
                        files = page.files.len(),
                        more = page.next_page_token.is_some(),
                        "Fetched page"
                    );
                    return Ok(page);
                }
                Err(e) if e.is_transient() && attempt <= self.retries => {
                    warn!(folder = %folder_id, attempt, "Retrying after error: {}", e);
                    thread::sleep(self.retry_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Escape a value for use inside a single-quoted Drive query literal
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn transport_error(folder_id: &FolderId, err: &reqwest::Error, attempt: u32) -> DriveError {
    if err.is_timeout() {
        DriveError::Timeout {
            folder_id: folder_id.to_string(),
            attempts: attempt,
        }
    } else {
        DriveError::Network {
            folder_id: folder_id.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Map a non-success status and its body to an error
fn status_error(folder_id: &FolderId, status: StatusCode, body: &str) -> DriveError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let folder_id = folder_id.to_string();

    match status {
        StatusCode::UNAUTHORIZED => DriveError::Unauthorized { folder_id, message },
        StatusCode::FORBIDDEN => DriveError::Forbidden { folder_id, message },
        StatusCode::NOT_FOUND => DriveError::NotFound { folder_id },
        _ => DriveError::Http {
            folder_id,
            status: status.as_u16(),
            message,
        },
    }
}

/// Builder for Drive clients
pub struct DriveClientBuilder {
    access_token: String,
    base_url: String,
    timeout: Duration,
    page_size: u32,
    shared_drives: bool,
    retries: u32,
    retry_delay: Duration,
}

impl DriveClientBuilder {
    /// Create a new builder
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            page_size: 100,
            shared_drives: false,
            retries: 0,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Override the API endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set results per page (clamped to 1..=1000)
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Include shared drive items in listings
    pub fn shared_drives(mut self, enabled: bool) -> Self {
        self.shared_drives = enabled;
        self
    }

    /// Set how many times a transient failure is retried
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the fixed pause before each retry
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Build the client
    pub fn build(self) -> DriveResult<DriveClient> {
        let http = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("drive-perm-walker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DriveError::InitFailed(e.to_string()))?;

        Ok(DriveClient {
            http,
            base_url: self.base_url,
            access_token: self.access_token,
            page_size: self.page_size,
            shared_drives: self.shared_drives,
            retries: self.retries,
            retry_delay: self.retry_delay,
        })
    }
}
