//! Title-metadata command - `Date: 19NN` descriptions from `NN.*` titles

use anyhow::{Context, Result};
use clap::Args;
use katapult_core::config::Config;
use katapult_mirror::{TitleAudit, TitleMetadataTagger};
use tracing::info;

use super::{ensure_valid, executor, parse_remote_id, remote_store};
use crate::output::{count_noun, get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct TitleMetadataCommand {
    /// Drive folder to process recursively
    #[arg(long)]
    pub folder_id: String,

    /// Only report files whose description lacks the title year
    #[arg(long)]
    pub verify_only: bool,
}

impl TitleMetadataCommand {
    pub async fn execute(&self, format: OutputFormat, config: &Config) -> Result<()> {
        let formatter = get_formatter(format);
        ensure_valid(config)?;

        let folder_id = parse_remote_id(&self.folder_id)?;
        let tagger = TitleMetadataTagger::new(
            remote_store(config)?,
            executor(config),
            config.mirror.page_size,
        );

        if !self.verify_only {
            info!(folder = %folder_id, "Applying title metadata");
            let patched = tagger
                .apply(&folder_id)
                .await
                .context("Failed to apply title metadata")?;
            if format.is_json() {
                formatter.print_json(&serde_json::json!({ "patched": patched }));
            } else {
                formatter.success(&format!("Tagged {}", count_noun(patched, "file")));
            }
        }

        let audit = tagger
            .verify(&folder_id)
            .await
            .context("Failed to verify title metadata")?;
        if format.is_json() {
            let json = serde_json::to_value(&audit).context("Failed to serialize audit")?;
            formatter.print_json(&json);
        } else {
            print_audit(formatter.as_ref(), &audit);
        }
        Ok(())
    }
}

fn print_audit(formatter: &dyn OutputFormatter, audit: &TitleAudit) {
    if audit.mismatched.is_empty() {
        formatter.success(&format!(
            "{} carry their title year",
            count_noun(audit.verified.len() as u64, "file")
        ));
        return;
    }

    formatter.warn(&format!(
        "{} lack their title year",
        count_noun(audit.mismatched.len() as u64, "file")
    ));
    for title in &audit.mismatched {
        formatter.info(title);
    }
}
