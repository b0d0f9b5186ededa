//! Progress reporting for the folder walker
//!
//! Provides a live status line using an indicatif spinner on stderr, so the
//! CSV report can go to stdout undisturbed.

use crate::walker::{WalkProgress, WalkStats};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays walk status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &WalkProgress) {
        self.bar.set_message(progress_message(progress));
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Stop ticking but leave the last line in place
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn progress_message(progress: &WalkProgress) -> String {
    let path = if progress.current_path.is_empty() {
        "/"
    } else {
        progress.current_path.as_str()
    };

    format!(
        "Folders: {} | Files: {} | Queue: {} | Now fetching {} ({})",
        format_number(progress.folders),
        format_number(progress.files),
        progress.pending,
        path,
        progress.current_folder,
    )
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the walk results
pub fn print_summary(stats: &WalkStats, output: &str) {
    let term = Term::stderr();
    let secs = stats.duration.as_secs_f64();
    let rate = if secs > 0.0 {
        stats.folders as f64 / secs
    } else {
        0.0
    };

    let lines = [
        String::new(),
        format!("{}", style("Walk Complete").green().bold()),
        format!("{}", style("─".repeat(50)).dim()),
        format!("  {} {}", style("Folders:").bold(), format_number(stats.folders)),
        format!("  {} {}", style("Files:").bold(), format_number(stats.files)),
        format!("  {} {}", style("Requests:").bold(), format_number(stats.pages)),
        format!(
            "  {} {:.1}s ({:.1} folders/sec)",
            style("Duration:").bold(),
            secs,
            rate
        ),
        format!("  {} {}", style("Report:").bold(), output),
        String::new(),
    ];

    for line in lines {
        let _ = term.write_line(&line);
    }
}

/// Print a header at the start of the walk
pub fn print_header(root: &str, format: &str, output: &str) {
    let term = Term::stderr();
    let lines = [
        String::new(),
        format!(
            "{} {}",
            style("drive-perm-walker").cyan().bold(),
            env!("CARGO_PKG_VERSION")
        ),
        format!("{}", style("─".repeat(50)).dim()),
        format!("  {} {}", style("Root folder:").bold(), root),
        format!("  {} {}", style("Format:").bold(), format),
        format!("  {} {}", style("Output:").bold(), output),
        String::new(),
    ];

    for line in lines {
        let _ = term.write_line(&line);
    }
}
