//! Error types for drive-perm-walker
//!
//! This module defines the error hierarchy that covers:
//! - Drive API listing errors
//! - Credential errors
//! - Permission normalization errors
//! - Report output errors
//! - Configuration and CLI errors
//!
//! Every failure is fatal for the run: the walker never skips a folder
//! it could not list, and the normalizer never guesses a display format.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the drive-perm-walker application
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Drive API errors
    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    /// Credential errors
    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    /// Permission normalization failed for a specific file
    #[error("Cannot summarize permissions of '{path}' ({file_id}): {source}")]
    FilePermission {
        file_id: String,
        path: String,
        source: PermissionError,
    },

    /// Report output errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Drive API listing errors
#[derive(Error, Debug)]
pub enum DriveError {
    /// Failed to build the HTTP client
    #[error("Failed to initialize HTTP client: {0}")]
    InitFailed(String),

    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("Request for folder '{folder_id}' failed: {reason}")]
    Network { folder_id: String, reason: String },

    /// Request timed out
    #[error("Request for folder '{folder_id}' timed out after {attempts} attempts")]
    Timeout { folder_id: String, attempts: u32 },

    /// Token rejected by the service
    #[error("Unauthorized listing folder '{folder_id}': {message}")]
    Unauthorized { folder_id: String, message: String },

    /// Caller lacks access, or quota exhausted
    #[error("Access denied listing folder '{folder_id}': {message}")]
    Forbidden { folder_id: String, message: String },

    /// Folder does not exist or is not visible
    #[error("Folder not found: '{folder_id}'")]
    NotFound { folder_id: String },

    /// Any other non-success status
    #[error("HTTP {status} listing folder '{folder_id}': {message}")]
    Http {
        folder_id: String,
        status: u16,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Malformed response for folder '{folder_id}': {reason}")]
    Decode { folder_id: String, reason: String },
}

impl DriveError {
    /// Check if this error may succeed when the same request is repeated
    pub fn is_transient(&self) -> bool {
        match self {
            DriveError::Network { .. } | DriveError::Timeout { .. } => true,
            DriveError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Credential acquisition errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Credentials file missing
    #[error(
        "Credentials file '{path}' not found (pass --access-token, or a client secret file to authorize)"
    )]
    MissingCredentials { path: PathBuf },

    /// Credentials file could not be read or parsed
    #[error("Invalid credentials file '{path}': {reason}")]
    InvalidCredentials { path: PathBuf, reason: String },

    /// OAuth client secret file could not be read or parsed
    #[error("Invalid client secret file '{path}': {reason}")]
    InvalidClientSecret { path: PathBuf, reason: String },

    /// Interactive authorization did not produce a token
    #[error("Authorization failed: {0}")]
    ConsentFailed(String),

    /// Newly obtained credentials could not be stored
    #[error("Failed to save credentials to '{path}': {reason}")]
    SaveFailed { path: PathBuf, reason: String },

    /// Token endpoint refused the refresh
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Nothing usable in the credentials
    #[error("Credentials contain neither a refresh token nor an access token")]
    NoToken,
}

/// Permission normalization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// Grantee type with no known display format
    #[error("Unknown grantee type '{kind}' in permission '{permission_id}'")]
    UnknownGranteeType { kind: String, permission_id: String },

    /// Grantee lacks the field its display format needs
    #[error("Permission '{permission_id}' of type '{kind}' has no {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
        permission_id: String,
    },
}

/// Report output errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to create the output file
    #[error("Failed to create report at '{path}': {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// I/O error while flushing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Root folder argument is neither an id nor a folder URL
    #[error("Invalid folder id '{input}': {reason}")]
    InvalidFolderId { input: String, reason: String },

    /// Invalid page size
    #[error("Invalid page size {size}: must be between {min} and {max}")]
    InvalidPageSize { size: u32, min: u32, max: u32 },

    /// Invalid timeout
    #[error("Invalid timeout {secs}s: must be at least 1 second")]
    InvalidTimeout { secs: u64 },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for DriveError
pub type DriveResult<T> = std::result::Result<T, DriveError>;

/// Result type alias for AuthError
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Result type alias for ReportError
pub type ReportResult<T> = std::result::Result<T, ReportError>;
