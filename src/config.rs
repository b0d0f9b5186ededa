//! Configuration types for drive-perm-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Root folder parsing (bare ids and Drive folder URLs)

use crate::drive::client::MAX_PAGE_SIZE;
use crate::drive::types::FolderId;
use crate::error::ConfigError;
use crate::report::OutputFormat;
use clap::Parser;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

/// Page size limits accepted by Drive
const MIN_PAGE_SIZE: u32 = 1;

/// Output path meaning "standard output"
const STDOUT_MARKER: &str = "-";

/// Regex for a bare Drive id
static FOLDER_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid folder id regex"));

/// Regex for Drive folder URLs
static FOLDER_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // Matches: https://drive.google.com/drive/folders/<id>, .../drive/u/0/folders/<id>,
    // https://drive.google.com/open?id=<id>
    Regex::new(
        r"^https?://drive\.google\.com/(?:drive/(?:u/\d+/)?folders/|open\?id=)([A-Za-z0-9_-]+)(?:[/?#].*)?$",
    )
    .expect("Invalid folder URL regex")
});

/// Export owners and writers of every file below a Google Drive folder
#[derive(Parser, Debug, Clone)]
#[command(
    name = "drive-perm-walker",
    version,
    about = "Exports owners and writers of all files below the given folder id",
    long_about = "Walks a Google Drive folder tree and records, for every file, its owner \
                  and the grantees with write access.\n\n\
                  Folders are listed one at a time with a short fixed pause in between. \
                  Any listing error aborts the walk.",
    after_help = "EXAMPLES:\n    \
        drive-perm-walker 1AbCdEfGhIjKlMnOp > perms.csv\n    \
        drive-perm-walker https://drive.google.com/drive/folders/1AbCdEf -o perms.csv\n    \
        drive-perm-walker 1AbCdEf --format sqlite -o perms.db --sort\n    \
        DRIVE_ACCESS_TOKEN=ya29... drive-perm-walker 1AbCdEf --shared-drives"
)]
pub struct CliArgs {
    /// Folder to start from (folder id or drive.google.com folder URL)
    #[arg(value_name = "ROOT_FOLDER_ID")]
    pub root_folder: String,

    /// Output file ('-' for standard output)
    #[arg(short = 'o', long = "output-file", default_value = STDOUT_MARKER, value_name = "FILE")]
    pub output: PathBuf,

    /// Report format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Stored OAuth credentials (authorized-user JSON)
    #[arg(long, default_value = "credentials.json", value_name = "FILE")]
    pub credentials: PathBuf,

    /// OAuth client secret used to authorize when no usable credentials exist
    #[arg(long, default_value = "client_secret.json", value_name = "FILE")]
    pub client_secret: PathBuf,

    /// Use this access token instead of the credentials file
    #[arg(long, env = "DRIVE_ACCESS_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// Pause between folder listings in milliseconds
    #[arg(long, default_value = "125", value_name = "MS")]
    pub delay_ms: u64,

    /// Results requested per listing page (1-1000)
    #[arg(long, default_value = "100", value_name = "NUM")]
    pub page_size: u32,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    pub timeout: u64,

    /// Number of retry attempts for transient listing errors
    #[arg(long, default_value = "0", value_name = "NUM")]
    pub retries: u32,

    /// Include items that live in shared drives
    #[arg(long)]
    pub shared_drives: bool,

    /// Sort the report by path and name instead of discovery order
    #[arg(long)]
    pub sort: bool,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated report format and destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportTarget {
    CsvStdout,
    CsvFile(PathBuf),
    SqliteFile(PathBuf),
}

impl ReportTarget {
    /// Combine the output path and format, rejecting SQLite to stdout
    pub fn new(output: &Path, format: OutputFormat) -> Result<Self, ConfigError> {
        let stdout = output.as_os_str() == STDOUT_MARKER;
        match (format, stdout) {
            (OutputFormat::Csv, true) => Ok(ReportTarget::CsvStdout),
            (OutputFormat::Csv, false) => Ok(ReportTarget::CsvFile(output.to_path_buf())),
            (OutputFormat::Sqlite, false) => Ok(ReportTarget::SqliteFile(output.to_path_buf())),
            (OutputFormat::Sqlite, true) => Err(ConfigError::InvalidOutputPath {
                path: output.to_path_buf(),
                reason: "SQLite output needs a file, pass --output-file".to_string(),
            }),
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            ReportTarget::CsvStdout | ReportTarget::CsvFile(_) => OutputFormat::Csv,
            ReportTarget::SqliteFile(_) => OutputFormat::Sqlite,
        }
    }

    /// Output file, `None` for stdout
    pub fn path(&self) -> Option<&Path> {
        match self {
            ReportTarget::CsvStdout => None,
            ReportTarget::CsvFile(path) | ReportTarget::SqliteFile(path) => Some(path),
        }
    }
}

impl fmt::Display for ReportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            None => f.write_str("<stdout>"),
            Some(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse the root folder argument
///
/// Accepts formats:
/// - 1AbCdEfGhIjKlMnOp
/// - root (the caller's My Drive)
/// - https://drive.google.com/drive/folders/<id>
/// - https://drive.google.com/drive/u/0/folders/<id>?usp=sharing
/// - https://drive.google.com/open?id=<id>
pub fn parse_folder_id(input: &str) -> Result<FolderId, ConfigError> {
    let input = input.trim();

    if let Some(caps) = FOLDER_URL_REGEX.captures(input) {
        let id = caps.get(1).ok_or_else(|| ConfigError::InvalidFolderId {
            input: input.to_string(),
            reason: "Missing folder id in URL".into(),
        })?;
        return Ok(FolderId::from(id.as_str()));
    }

    if FOLDER_ID_REGEX.is_match(input) {
        return Ok(FolderId::from(input));
    }

    Err(ConfigError::InvalidFolderId {
        input: input.to_string(),
        reason: "Expected a folder id or https://drive.google.com/drive/folders/<id>".into(),
    })
}

/// Validated runtime configuration
#[derive(Clone)]
pub struct WalkConfig {
    /// Folder the walk starts from
    pub root_folder: FolderId,

    /// Report format and destination
    pub report: ReportTarget,

    /// Stored credentials file
    pub credentials_path: PathBuf,

    /// OAuth client secret for the first-run authorization
    pub client_secret_path: PathBuf,

    /// Explicit access token (overrides the credentials file)
    pub access_token: Option<String>,

    /// Pause between folder listings
    pub request_delay: Duration,

    /// Results per listing page
    pub page_size: u32,

    /// HTTP request timeout
    pub timeout: Duration,

    /// Retry count for transient errors
    pub retry_count: u32,

    /// Include shared drive items
    pub shared_drives: bool,

    /// Sort the report by path and name
    pub sort_output: bool,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl fmt::Debug for WalkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkConfig")
            .field("root_folder", &self.root_folder)
            .field("report", &self.report)
            .field("credentials_path", &self.credentials_path)
            .field("client_secret_path", &self.client_secret_path)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_delay", &self.request_delay)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .field("retry_count", &self.retry_count)
            .field("shared_drives", &self.shared_drives)
            .field("sort_output", &self.sort_output)
            .field("show_progress", &self.show_progress)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl WalkConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let root_folder = parse_folder_id(&args.root_folder)?;

        // Validate page size
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&args.page_size) {
            return Err(ConfigError::InvalidPageSize {
                size: args.page_size,
                min: MIN_PAGE_SIZE,
                max: MAX_PAGE_SIZE,
            });
        }

        // Validate timeout
        if args.timeout == 0 {
            return Err(ConfigError::InvalidTimeout { secs: args.timeout });
        }

        // Validate output target
        let report = ReportTarget::new(&args.output, args.format)?;
        if let Some(parent) = report.path().and_then(Path::parent) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(ConfigError::InvalidOutputPath {
                    path: args.output.clone(),
                    reason: format!("Parent directory '{}' does not exist", parent.display()),
                });
            }
        }

        Ok(Self {
            root_folder,
            report,
            credentials_path: args.credentials,
            client_secret_path: args.client_secret,
            access_token: args.access_token,
            request_delay: Duration::from_millis(args.delay_ms),
            page_size: args.page_size,
            timeout: Duration::from_secs(args.timeout),
            retry_count: args.retries,
            shared_drives: args.shared_drives,
            sort_output: args.sort,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }
}
