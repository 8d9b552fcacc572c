//! Katapult Mirror - one-directional mirror engine
//!
//! Provides:
//! - A durable path-to-id cache for remote folders
//! - Transient-failure retries with exponential backoff
//! - Lazy paginated listing of remote folders
//! - Local tree walking with hidden-entry filtering
//! - The mirror driver, reconciliation and title-metadata tagging
//!
//! ## Modules
//!
//! - [`cache`] - Remote directory cache persisted as `path,id` lines
//! - [`retry`] - Retry executor parameterized by a classification predicate
//! - [`lister`] - Remote tree lister (streams pages, explicit worklist walk)
//! - [`walker`] - Local tree walker built on `walkdir`
//! - [`engine`] - Mirror driver creating folders and uploading files
//! - [`reconcile`] - Name-level comparison of local and remote trees
//! - [`title_metadata`] - `NN.*` title to description tagging and audit
//! - [`metadata`] / [`colors`] - CSV metadata table and folder color map
//! - [`journal`] - Append-only upload log

pub mod cache;
pub mod colors;
pub mod engine;
pub mod journal;
pub mod lister;
pub mod metadata;
pub mod reconcile;
pub mod retry;
pub mod title_metadata;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use katapult_core::domain::{DomainError, LogicalPath, RemoteId};
use katapult_core::ports::RemoteError;
use thiserror::Error;

pub use cache::DirectoryCache;
pub use colors::ColorMap;
pub use engine::{MirrorDriver, MirrorReport, ProgressCallback, ProgressUpdate};
pub use journal::UploadLog;
pub use lister::RemoteLister;
pub use metadata::MetadataTable;
pub use reconcile::{ReconcileReport, Reconciler};
pub use retry::{RetryExecutor, RetryPolicy};
pub use title_metadata::{TitleAudit, TitleMetadataTagger};

/// Errors that can occur during mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A path was recorded in the cache with a different id than before
    #[error("Duplicate cache entry for {path}: cached {existing}, got {new}")]
    DuplicatePath {
        path: LogicalPath,
        existing: RemoteId,
        new: RemoteId,
    },

    /// A directory was reached before its parent had a remote folder
    #[error("Parent folder of {0} is not known remotely")]
    OrphanDirectory(LogicalPath),

    /// The mirror root does not exist or is not a directory
    #[error("Invalid mirror root: {0}")]
    InvalidRoot(PathBuf),

    /// The cache file could not be parsed
    #[error("Corrupt cache file {path} at line {line}: {reason}")]
    CorruptCache {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The metadata table could not be loaded
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// An I/O error occurred on the local side
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local tree traversal failed
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A remote store operation failed (after retries, when transient)
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A domain-level error propagated from katapult-core
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
