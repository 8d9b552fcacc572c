//! UploadLog - append-only operator trail
//!
//! Every line is `"{timestamp}: {message}"` in local time. The log is a
//! durable record kept next to the cache file; it complements `tracing`
//! output rather than replacing it. Write failures are logged via
//! `tracing::warn!` and never propagated, so a full disk or a read-only
//! log file cannot abort a mirror run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Timestamp layout of each log line, e.g. `2016-03-01 14:02:11.123456`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Append-only upload log
#[derive(Debug, Clone)]
pub struct UploadLog {
    path: Option<PathBuf>,
}

impl UploadLog {
    /// A log appending to `path` (created on first write)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A log that discards every message
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Path of the log file, if enabled
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one timestamped line, swallowing write errors with a warning
    pub fn record(&self, message: &str) {
        let Some(path) = &self.path else {
            return;
        };
        let line = format!("{}: {}\n", Local::now().format(TIMESTAMP_FORMAT), message);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write upload log");
        }
    }
}
