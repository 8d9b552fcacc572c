//! Configuration module for Katapult.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Katapult.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mirror: MirrorConfig,
    pub retry: RetryConfig,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

/// Mirror run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Durable path-to-id cache file.
    pub cache_file: PathBuf,
    /// Append-only operator log of uploads and retries.
    pub upload_log: PathBuf,
    /// Page size hint for folder listings.
    pub page_size: u32,
    /// Remote folder id the mirrored root is created under.
    pub remote_parent: String,
}

/// Transient-failure retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Guarded attempts before the final unguarded one.
    pub max_retries: u32,
    /// Delay before the first retry, in seconds.
    pub initial_delay_secs: u64,
    /// Multiplier applied to the delay after each retry.
    pub backoff: u32,
}

/// Remote store endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the Drive REST API.
    pub base_url: String,
    /// Environment variable holding the bearer access token.
    pub token_env: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/katapult/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("katapult")
            .join("config.yaml")
    }
}

impl RetryConfig {
    /// Initial delay as a [`Duration`].
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default Drive API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Default environment variable carrying the access token.
pub const DEFAULT_TOKEN_ENV: &str = "KATAPULT_ACCESS_TOKEN";

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            cache_file: PathBuf::from("dir_ids.csv"),
            upload_log: PathBuf::from("upload_logs.dat"),
            page_size: 1000,
            remote_parent: "root".to_string(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_delay_secs: 3,
            backoff: 2,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"retry.backoff"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- mirror ---
        if self.mirror.cache_file.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "mirror.cache_file".into(),
                message: "must not be empty".into(),
            });
        }
        if self.mirror.upload_log.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "mirror.upload_log".into(),
                message: "must not be empty".into(),
            });
        }
        if self.mirror.page_size == 0 || self.mirror.page_size > 1000 {
            errors.push(ValidationError {
                field: "mirror.page_size".into(),
                message: format!(
                    "must be between 1 and 1000, got {}",
                    self.mirror.page_size
                ),
            });
        }
        if self.mirror.remote_parent.trim().is_empty() {
            errors.push(ValidationError {
                field: "mirror.remote_parent".into(),
                message: "must not be empty".into(),
            });
        }

        // --- retry ---
        if self.retry.initial_delay_secs == 0 {
            errors.push(ValidationError {
                field: "retry.initial_delay_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.retry.backoff == 0 {
            errors.push(ValidationError {
                field: "retry.backoff".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- remote ---
        if !self.remote.base_url.starts_with("http://")
            && !self.remote.base_url.starts_with("https://")
        {
            errors.push(ValidationError {
                field: "remote.base_url".into(),
                message: format!("must be an http(s) URL, got '{}'", self.remote.base_url),
            });
        }
        if self.remote.token_env.trim().is_empty() {
            errors.push(ValidationError {
                field: "remote.token_env".into(),
                message: "must not be empty".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "must be one of {:?}, got '{}'",
                    VALID_LOG_LEVELS, self.logging.level
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use katapult_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .mirror_cache_file(PathBuf::from("/var/lib/katapult/dir_ids.csv"))
///     .retry_max_retries(5)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- mirror ---

    pub fn mirror_cache_file(mut self, path: PathBuf) -> Self {
        self.config.mirror.cache_file = path;
        self
    }

    pub fn mirror_upload_log(mut self, path: PathBuf) -> Self {
        self.config.mirror.upload_log = path;
        self
    }

    pub fn mirror_page_size(mut self, n: u32) -> Self {
        self.config.mirror.page_size = n;
        self
    }

    pub fn mirror_remote_parent(mut self, id: impl Into<String>) -> Self {
        self.config.mirror.remote_parent = id.into();
        self
    }

    // --- retry ---

    pub fn retry_max_retries(mut self, n: u32) -> Self {
        self.config.retry.max_retries = n;
        self
    }

    pub fn retry_initial_delay_secs(mut self, seconds: u64) -> Self {
        self.config.retry.initial_delay_secs = seconds;
        self
    }

    pub fn retry_backoff(mut self, factor: u32) -> Self {
        self.config.retry.backoff = factor;
        self
    }

    // --- remote ---

    pub fn remote_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.base_url = url.into();
        self
    }

    pub fn remote_token_env(mut self, var: impl Into<String>) -> Self {
        self.config.remote.token_env = var.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
