//! Upload progress accounting

use serde::{Deserialize, Serialize};

/// Counts files uploaded during one mirror run
///
/// `total_files` is fixed by a counting pass before the first upload.
/// `uploaded_files` moves once per successful upload, never per attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCounter {
    total_files: u64,
    uploaded_files: u64,
}

impl UploadCounter {
    #[must_use]
    pub fn new(total_files: u64) -> Self {
        Self {
            total_files,
            uploaded_files: 0,
        }
    }

    #[must_use]
    pub fn total_files(&self) -> u64 {
        self.total_files
    }

    #[must_use]
    pub fn uploaded_files(&self) -> u64 {
        self.uploaded_files
    }

    /// Record one successful upload
    pub fn record_upload(&mut self) {
        self.uploaded_files += 1;
    }

    /// Integer percentage of uploaded files, 100 for an empty tree
    #[must_use]
    pub fn percent(&self) -> u64 {
        if self.total_files == 0 {
            return 100;
        }
        self.uploaded_files * 100 / self.total_files
    }
}
