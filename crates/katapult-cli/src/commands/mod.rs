//! Subcommands and the wiring they share

pub mod check;
pub mod config;
pub mod mirror;
pub mod title_metadata;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use katapult_core::config::Config;
use katapult_core::domain::RemoteId;
use katapult_core::ports::IRemoteStore;
use katapult_drive::client::DriveClient;
use katapult_drive::provider::DriveRemoteStore;
use katapult_mirror::{RetryExecutor, RetryPolicy, UploadLog};

/// Refuse to run with an invalid configuration
pub(crate) fn ensure_valid(config: &Config) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
    bail!("Invalid configuration: {}", details.join("; "))
}

/// Access token from the environment variable named in the config
pub(crate) fn access_token(config: &Config) -> Result<String> {
    let var = &config.remote.token_env;
    let token = std::env::var(var)
        .with_context(|| format!("Access token not found: set {var}"))?;
    if token.trim().is_empty() {
        bail!("Access token in {var} is empty");
    }
    Ok(token)
}

/// Drive-backed remote store
pub(crate) fn remote_store(config: &Config) -> Result<Arc<dyn IRemoteStore>> {
    let token = access_token(config)?;
    let client = DriveClient::with_base_url(token, config.remote.base_url.clone());
    Ok(Arc::new(DriveRemoteStore::new(client)))
}

/// Retry executor journaling to the configured upload log
pub(crate) fn executor(config: &Config) -> RetryExecutor {
    RetryExecutor::new(
        RetryPolicy::from(&config.retry),
        UploadLog::new(&config.mirror.upload_log),
    )
}

pub(crate) fn parse_remote_id(value: &str) -> Result<RemoteId> {
    RemoteId::new(value).with_context(|| format!("Invalid folder id: {value}"))
}
