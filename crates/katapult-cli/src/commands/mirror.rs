//! Mirror command - Propagate a local tree into Drive
//!
//! Provides the `katapult mirror` CLI command which:
//! 1. Validates the configuration and reads the access token
//! 2. Loads the optional metadata table and color map
//! 3. Runs the MirrorDriver, printing a line per upload
//! 4. Prints the run summary

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use katapult_core::config::Config;
use katapult_mirror::{ColorMap, MetadataTable, MirrorDriver, MirrorReport, ProgressUpdate};
use tracing::info;

use super::{ensure_valid, executor, parse_remote_id, remote_store};
use crate::output::{count_noun, format_duration, get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct MirrorCommand {
    /// Local directory to mirror
    #[arg(long)]
    pub root_dir: PathBuf,

    /// CSV file with `key,date,title,description` rows
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// File with `name,color` rows for new folders
    #[arg(long)]
    pub color_map: Option<PathBuf>,

    /// Drive folder to create the mirror under (default from config)
    #[arg(long)]
    pub parent: Option<String>,
}

impl MirrorCommand {
    pub async fn execute(&self, format: OutputFormat, config: &Config) -> Result<()> {
        let formatter: Arc<dyn OutputFormatter> = Arc::from(get_formatter(format));
        ensure_valid(config)?;

        let store = remote_store(config)?;
        let remote_parent = parse_remote_id(
            self.parent
                .as_deref()
                .unwrap_or(&config.mirror.remote_parent),
        )?;

        let sink = Arc::clone(&formatter);
        let mut driver = MirrorDriver::new(
            store,
            executor(config),
            &config.mirror.cache_file,
            config.mirror.page_size,
        )
        .with_remote_parent(remote_parent)
        .with_progress(Box::new(move |update: &ProgressUpdate| sink.progress(update)));

        if let Some(path) = &self.metadata {
            let table = MetadataTable::load(path)
                .with_context(|| format!("Failed to load metadata from {}", path.display()))?;
            driver = driver.with_metadata(table);
        }
        if let Some(path) = &self.color_map {
            let colors = ColorMap::load(path)
                .with_context(|| format!("Failed to load color map from {}", path.display()))?;
            driver = driver.with_colors(colors);
        }

        info!(root = %self.root_dir.display(), "Starting mirror");
        formatter.info(&format!("Mirroring {}...", self.root_dir.display()));

        let report = driver
            .mirror(&self.root_dir)
            .await
            .with_context(|| format!("Mirror of {} failed", self.root_dir.display()))?;

        print_report(formatter.as_ref(), format, &report)
    }
}

fn print_report(
    formatter: &dyn OutputFormatter,
    format: OutputFormat,
    report: &MirrorReport,
) -> Result<()> {
    if format.is_json() {
        let json = serde_json::to_value(report).context("Failed to serialize mirror report")?;
        formatter.print_json(&json);
        return Ok(());
    }

    if report.folders_created == 0 && report.files_uploaded == 0 {
        formatter.success("Already up to date");
    } else {
        formatter.success(&format!(
            "Mirror completed in {}",
            format_duration(report.duration_ms)
        ));
    }
    formatter.info(&format!(
        "Folders:  {} created, {} reused",
        report.folders_created, report.folders_reused
    ));
    formatter.info(&format!(
        "Files:    {} uploaded, {} already present",
        report.files_uploaded, report.files_skipped
    ));
    formatter.info(&format!("Scanned:  {}", count_noun(report.total_files, "file")));
    Ok(())
}
