//! Katapult CLI - Command-line interface for Katapult
//!
//! Provides commands for:
//! - Mirroring a local tree into Google Drive
//! - Checking a mirror against the local tree
//! - Tagging and auditing year descriptions from file titles
//! - Viewing and validating configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use katapult_core::config::Config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    check::CheckCommand, config::ConfigCommand, mirror::MirrorCommand,
    title_metadata::TitleMetadataCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "katapult",
    version,
    about = "Mirror local directory trees into Google Drive"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Mirror a local directory tree into Drive
    Mirror(MirrorCommand),
    /// Compare a local tree with a Drive folder
    Check(CheckCommand),
    /// Set or verify `Date: 19NN` descriptions from `NN.*` titles
    TitleMetadata(TitleMetadataCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Level used when neither `-v` nor `RUST_LOG` is given
fn filter_directive(verbose: u8, configured: &str) -> &str {
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Setup tracing
    let filter = filter_directive(cli.verbose, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    debug!(config_path = %config_path.display(), "Loaded configuration");

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Mirror(cmd) => cmd.execute(format, &config).await,
        Commands::Check(cmd) => cmd.execute(format, &config).await,
        Commands::TitleMetadata(cmd) => cmd.execute(format, &config).await,
        Commands::Config(cmd) => cmd.execute(format, &config, &config_path).await,
    }
}
