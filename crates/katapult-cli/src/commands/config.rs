//! Config command - View and validate Katapult configuration
//!
//! Provides the `katapult config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Validates the configuration file and reports errors

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use katapult_core::config::{Config, ValidationError};
use tracing::info;

use crate::output::{count_noun, get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, format: OutputFormat, config: &Config, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Show => show(format, config, path),
            ConfigCommand::Validate => validate(format, path),
        }
    }
}

fn show(format: OutputFormat, config: &Config, path: &Path) -> Result<()> {
    let formatter = get_formatter(format);
    info!(config_path = %path.display(), "Showing configuration");

    if format.is_json() {
        let json =
            serde_json::to_value(config).context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
    } else {
        formatter.success(&format!("Configuration ({})", path.display()));
        formatter.info("");
        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            formatter.info(line);
        }
    }
    Ok(())
}

/// Problems with the file at `path`, or `None` when it does not exist
fn check_file(path: &Path) -> Option<Vec<String>> {
    if !path.exists() {
        return None;
    }
    let errors = match Config::load(path) {
        Ok(config) => config
            .validate()
            .iter()
            .map(ValidationError::to_string)
            .collect(),
        Err(e) => vec![format!("Failed to parse configuration: {e}")],
    };
    Some(errors)
}

fn validate(format: OutputFormat, path: &Path) -> Result<()> {
    let formatter = get_formatter(format);
    info!(config_path = %path.display(), "Validating configuration");

    let Some(errors) = check_file(path) else {
        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "valid": true,
                "config_path": path.display().to_string(),
                "errors": [],
                "defaults": true,
            }));
        } else {
            formatter.info(&format!(
                "Configuration file not found at {}; defaults apply",
                path.display()
            ));
        }
        return Ok(());
    };

    if format.is_json() {
        formatter.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": path.display().to_string(),
            "errors": errors,
        }));
    } else if errors.is_empty() {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", path.display()));
    } else {
        formatter.error(&format!(
            "Configuration has {}:",
            count_noun(errors.len() as u64, "error")
        ));
        formatter.info(&format!("File: {}", path.display()));
        for error in &errors {
            formatter.info(&format!("  {error}"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Invalid configuration in {}", path.display())
    }
}
