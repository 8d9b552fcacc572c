//! Check command - Compare a local tree with a Drive folder

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use katapult_core::config::Config;
use katapult_mirror::{ReconcileReport, Reconciler, RemoteLister};
use tracing::info;

use super::{ensure_valid, executor, parse_remote_id, remote_store};
use crate::output::{count_noun, get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Local directory that was mirrored
    #[arg(long)]
    pub root_dir: PathBuf,

    /// Drive folder holding the mirror
    #[arg(long)]
    pub folder_id: String,
}

impl CheckCommand {
    pub async fn execute(&self, format: OutputFormat, config: &Config) -> Result<()> {
        let formatter = get_formatter(format);
        ensure_valid(config)?;

        let folder_id = parse_remote_id(&self.folder_id)?;
        let lister = RemoteLister::new(
            remote_store(config)?,
            executor(config),
            config.mirror.page_size,
        );

        info!(root = %self.root_dir.display(), folder = %folder_id, "Checking mirror");
        let report = Reconciler::new(lister)
            .reconcile(&self.root_dir, &folder_id)
            .await
            .context("Check failed")?;

        if format.is_json() {
            let json =
                serde_json::to_value(&report).context("Failed to serialize check report")?;
            formatter.print_json(&json);
        } else {
            print_human(formatter.as_ref(), &report);
        }
        Ok(())
    }
}

fn print_human(formatter: &dyn OutputFormatter, report: &ReconcileReport) {
    if report.matched {
        formatter.success(&format!(
            "Local and remote both hold {}",
            count_noun(report.local_total, "item")
        ));
        return;
    }

    formatter.warn(&format!(
        "Local holds {}, remote holds {}",
        report.local_total, report.remote_total
    ));
    for name in &report.missing_remote {
        formatter.info(&format!("missing remotely: {name}"));
    }
    for name in &report.missing_local {
        formatter.info(&format!("missing locally:  {name}"));
    }
}
