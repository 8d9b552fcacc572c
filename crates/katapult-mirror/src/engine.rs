//! Mirror driver
//!
//! The [`MirrorDriver`] propagates a local tree into the remote store, one
//! way and sequentially.
//!
//! ## Mirror Flow
//!
//! 1. **Restore**: load the directory cache from its file
//! 2. **Count**: walk the tree once to size the progress counter
//! 3. **Mirror**: directories in pre-order; each one is resolved to a
//!    remote folder (cached, discovered or created), then its missing files
//!    are uploaded
//! 4. **Persist**: write the cache back, only when every step succeeded
//!
//! Transient remote failures are retried by the [`RetryExecutor`]; anything
//! else aborts the run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use katapult_core::config::Config;
use katapult_core::domain::{LogicalPath, NodeKind, RemoteId, UploadCounter};
use katapult_core::ports::{FileUpload, IRemoteStore, NewNode};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::DirectoryCache;
use crate::colors::ColorMap;
use crate::journal::UploadLog;
use crate::lister::RemoteLister;
use crate::metadata::MetadataTable;
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::walker::{DirListing, LocalWalker};
use crate::MirrorError;

/// Summary of a completed mirror run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MirrorReport {
    /// Remote folders created during this run
    pub folders_created: u64,
    /// Directories resolved from the cache or found already present remotely
    pub folders_reused: u64,
    /// Files uploaded during this run
    pub files_uploaded: u64,
    /// Files skipped because a node with the same title already existed
    pub files_skipped: u64,
    /// Non-hidden files found by the counting pass
    pub total_files: u64,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

/// Progress after one upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub percent: u64,
    pub uploaded: u64,
    pub total: u64,
    pub title: String,
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% processed  Uploaded file: {}",
            self.percent, self.title
        )
    }
}

/// Called after every successful upload
pub type ProgressCallback = Box<dyn Fn(&ProgressUpdate) + Send + Sync>;

/// Drives one-directional mirror runs against a remote store
pub struct MirrorDriver {
    store: Arc<dyn IRemoteStore>,
    executor: RetryExecutor,
    lister: RemoteLister,
    cache: DirectoryCache,
    counter: UploadCounter,
    remote_parent: RemoteId,
    metadata: Option<MetadataTable>,
    colors: ColorMap,
    progress: Option<ProgressCallback>,
}

impl MirrorDriver {
    /// Create a driver whose cache lives at `cache_path`
    ///
    /// The mirror root is created under the Drive root unless
    /// [`with_remote_parent`](Self::with_remote_parent) says otherwise.
    pub fn new(
        store: Arc<dyn IRemoteStore>,
        executor: RetryExecutor,
        cache_path: impl Into<PathBuf>,
        page_size: u32,
    ) -> Self {
        let lister = RemoteLister::new(Arc::clone(&store), executor.clone(), page_size);
        Self {
            store,
            executor,
            lister,
            cache: DirectoryCache::empty(cache_path),
            counter: UploadCounter::new(0),
            remote_parent: RemoteId::drive_root(),
            metadata: None,
            colors: ColorMap::default(),
            progress: None,
        }
    }

    /// Create a driver from the `mirror` and `retry` configuration sections
    pub fn from_config(store: Arc<dyn IRemoteStore>, config: &Config) -> Result<Self, MirrorError> {
        let journal = UploadLog::new(&config.mirror.upload_log);
        let executor = RetryExecutor::new(RetryPolicy::from(&config.retry), journal);
        let remote_parent = RemoteId::new(config.mirror.remote_parent.clone())?;
        Ok(Self::new(
            store,
            executor,
            &config.mirror.cache_file,
            config.mirror.page_size,
        )
        .with_remote_parent(remote_parent))
    }

    /// Folder under which the mirror root is created
    pub fn with_remote_parent(mut self, parent: RemoteId) -> Self {
        self.remote_parent = parent;
        self
    }

    /// Attach descriptions from a metadata table to uploads
    pub fn with_metadata(mut self, metadata: MetadataTable) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Color new folders from a color map
    pub fn with_colors(mut self, colors: ColorMap) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Directory cache as of the last run
    pub fn cache(&self) -> &DirectoryCache {
        &self.cache
    }

    pub fn counter(&self) -> &UploadCounter {
        &self.counter
    }

    fn journal(&self) -> &UploadLog {
        self.executor.journal()
    }

    /// Mirror the tree at `root` into the remote store
    ///
    /// # Errors
    /// Any fatal error aborts the run. The cache file is left as it was
    /// before the run; folders created so far are found again by the next
    /// run.
    pub async fn mirror(&mut self, root: &Path) -> Result<MirrorReport, MirrorError> {
        let start = Instant::now();
        match self.run(root).await {
            Ok(mut report) => {
                report.duration_ms = start.elapsed().as_millis() as u64;
                info!(
                    folders_created = report.folders_created,
                    folders_reused = report.folders_reused,
                    files_uploaded = report.files_uploaded,
                    files_skipped = report.files_skipped,
                    duration_ms = report.duration_ms,
                    "Mirror completed"
                );
                self.journal().record(&format!(
                    "Mirror completed: {} folders created, {} files uploaded",
                    report.folders_created, report.files_uploaded
                ));
                Ok(report)
            }
            Err(err) => {
                error!(error = %err, root = %root.display(), "Mirror aborted");
                self.journal().record(&format!("Mirror aborted: {err}"));
                Err(err)
            }
        }
    }

    async fn run(&mut self, root: &Path) -> Result<MirrorReport, MirrorError> {
        let walker = LocalWalker::open(root)?;
        self.cache = DirectoryCache::restore(self.cache.path().to_path_buf())?;

        let total_files = walker.count_files()?;
        self.counter = UploadCounter::new(total_files);

        info!(
            root = %walker.root().display(),
            remote_parent = %self.remote_parent,
            total_files,
            cached_folders = self.cache.len(),
            "Starting mirror"
        );

        let mut report = MirrorReport {
            total_files,
            ..MirrorReport::default()
        };

        for listing in walker.walk() {
            let listing = listing?;
            let folder_id = self.resolve_directory(&listing.logical, &mut report).await?;
            self.mirror_files(&listing, &folder_id, &mut report).await?;
        }

        self.cache.persist()?;
        Ok(report)
    }

    /// Remote folder for a local directory, created if needed
    async fn resolve_directory(
        &mut self,
        logical: &LogicalPath,
        report: &mut MirrorReport,
    ) -> Result<RemoteId, MirrorError> {
        if let Some(id) = self.cache.lookup(logical) {
            debug!(path = %logical, id = %id, "Folder cached");
            report.folders_reused += 1;
            return Ok(id.clone());
        }

        let parent_id = match logical.parent() {
            None => self.remote_parent.clone(),
            Some(parent) => self
                .cache
                .lookup(&parent)
                .cloned()
                .ok_or_else(|| MirrorError::OrphanDirectory(logical.clone()))?,
        };
        let title = logical.leaf();

        if let Some(existing) = self
            .lister
            .find_child(&parent_id, title, Some(NodeKind::Folder))
            .await?
        {
            info!(path = %logical, id = %existing.id, "Found existing folder");
            self.journal()
                .record(&format!("Found existing directory: {logical}"));
            self.cache.record(logical.clone(), existing.id.clone())?;
            report.folders_reused += 1;
            return Ok(existing.id);
        }

        let color = self.colors.color_for(title).map(str::to_string);
        let node = NewNode::folder(title, parent_id).with_color(color);
        let created = self
            .executor
            .run("create_node", || self.store.create_node(&node))
            .await?;

        info!(path = %logical, id = %created.id, "Created folder");
        self.journal()
            .record(&format!("Success: created a directory {logical}"));
        self.cache.record(logical.clone(), created.id.clone())?;
        report.folders_created += 1;
        Ok(created.id)
    }

    async fn mirror_files(
        &mut self,
        listing: &DirListing,
        folder_id: &RemoteId,
        report: &mut MirrorReport,
    ) -> Result<(), MirrorError> {
        for file_name in &listing.files {
            if self.lister.find_child(folder_id, file_name, None).await?.is_some() {
                debug!(folder = %listing.logical, file = %file_name, "File already present");
                report.files_skipped += 1;
                continue;
            }

            let description = self.describe(file_name);
            let data = tokio::fs::read(listing.path.join(file_name)).await?;
            let upload = FileUpload {
                title: file_name.clone(),
                parent_id: folder_id.clone(),
                description,
                data,
            };
            let node = self
                .executor
                .run("upload_file", || self.store.upload_file(&upload))
                .await?;

            self.counter.record_upload();
            report.files_uploaded += 1;
            self.report_progress(node.title);
        }
        Ok(())
    }

    /// Rendered metadata description for a file, if the table has one
    fn describe(&self, file_name: &str) -> Option<String> {
        let table = self.metadata.as_ref()?;
        match table.lookup(file_name) {
            Some(record) => Some(record.render_description()),
            None => {
                warn!(file = %file_name, "No metadata found");
                self.journal()
                    .record(&format!("No metadata found for {file_name}"));
                None
            }
        }
    }

    fn report_progress(&self, title: String) {
        let update = ProgressUpdate {
            percent: self.counter.percent(),
            uploaded: self.counter.uploaded_files(),
            total: self.counter.total_files(),
            title,
        };
        let line = update.to_string();
        info!(
            uploaded = update.uploaded,
            total = update.total,
            "{line}"
        );
        self.journal().record(&line);
        if let Some(progress) = &self.progress {
            progress(&update);
        }
    }
}
