//! drive-perm-walker - Google Drive Sharing Permission Exporter
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use drive_perm_walker::config::{CliArgs, ReportTarget, WalkConfig};
use drive_perm_walker::drive::{resolve_access_token, DriveClientBuilder};
use drive_perm_walker::progress::{print_header, print_summary, ProgressReporter};
use drive_perm_walker::report::{
    CsvReport, OutputFormat, ReportContext, ReportWriter, SqliteReport,
};
use drive_perm_walker::walker::Traverser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = WalkConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(
            config.root_folder.as_str(),
            format_name(config.report.format()),
            &config.report.to_string(),
        );
    }

    // Credentials come first so an authorization problem surfaces before any listing
    let token = resolve_access_token(
        config.access_token.as_deref(),
        &config.credentials_path,
        &config.client_secret_path,
        config.timeout,
    )
    .context("Failed to obtain Drive credentials")?;

    let client = DriveClientBuilder::new(token)
        .timeout(config.timeout)
        .page_size(config.page_size)
        .shared_drives(config.shared_drives)
        .retries(config.retry_count)
        .build()
        .context("Failed to initialize Drive client")?;

    let progress = config.show_progress.then(ProgressReporter::new);
    if let Some(ref p) = progress {
        p.set_status("Listing root folder...");
    }

    let started_at = Utc::now();
    let traverser = Traverser::new(client).with_request_delay(config.request_delay);
    let walked = traverser.walk(&config.root_folder, |update| {
        if let Some(ref p) = progress {
            p.update(update);
        }
    });

    let mut result = match walked {
        Ok(result) => result,
        Err(e) => {
            if let Some(ref p) = progress {
                p.abandon();
            }
            return Err(e).context("Walk failed");
        }
    };

    if let Some(ref p) = progress {
        p.finish("Walk completed");
    }

    if config.sort_output {
        result.inventory.sort_by_path();
    }

    let context = ReportContext {
        root: &config.root_folder,
        stats: &result.stats,
        started_at,
    };
    let mut writer = open_report(&config.report)?;
    writer
        .write_report(&result.inventory, &context)
        .context("Failed to write report")?;

    info!(
        files = result.stats.files,
        output = %config.report,
        "Report written"
    );

    if config.show_progress {
        print_summary(&result.stats, &config.report.to_string());
    }

    Ok(())
}

fn open_report(target: &ReportTarget) -> Result<Box<dyn ReportWriter>> {
    let writer: Box<dyn ReportWriter> = match target {
        ReportTarget::CsvStdout => Box::new(CsvReport::stdout()),
        ReportTarget::CsvFile(path) => {
            Box::new(CsvReport::create(path).context("Failed to create CSV report")?)
        }
        ReportTarget::SqliteFile(path) => {
            Box::new(SqliteReport::create(path).context("Failed to create SQLite report")?)
        }
    };
    Ok(writer)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("drive_perm_walker=debug,warn")
    } else {
        EnvFilter::new("drive_perm_walker=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Csv => "CSV",
        OutputFormat::Sqlite => "SQLite",
    }
}
