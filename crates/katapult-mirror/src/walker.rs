//! Local tree walker
//!
//! Enumerates the mirror root with `walkdir`. Directories come before their
//! contents and siblings are sorted by name. Any entry whose name starts
//! with `.` is skipped together with everything below it; the root itself
//! is never filtered. Symbolic links are not followed.

use std::path::{Path, PathBuf};

use katapult_core::domain::{DomainError, EntryKind, InventoryEntry, LocalEntry, LogicalPath};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::MirrorError;

/// One local directory and the files directly inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    /// Absolute or root-relative filesystem path of the directory
    pub path: PathBuf,
    /// Mirror-relative path (first segment is the root name)
    pub logical: LogicalPath,
    /// Names of the non-hidden regular files, sorted
    pub files: Vec<String>,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.starts_with('.'))
}

fn entry_name(entry: &DirEntry) -> Result<String, MirrorError> {
    entry
        .file_name()
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| {
            DomainError::InvalidPath(format!(
                "Name is not valid UTF-8: {}",
                entry.path().display()
            ))
            .into()
        })
}

/// Walker over a validated mirror root
#[derive(Debug, Clone)]
pub struct LocalWalker {
    root: PathBuf,
    root_name: String,
}

impl LocalWalker {
    /// Validate `root` and derive the mirror root name from it
    ///
    /// # Errors
    /// Returns `MirrorError::InvalidRoot` if `root` is missing, not a
    /// directory, or has no usable name (such as `/`)
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, MirrorError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(MirrorError::InvalidRoot(root));
        }

        let canonical = root
            .canonicalize()
            .map_err(|_| MirrorError::InvalidRoot(root.clone()))?;
        let root_name = canonical
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| MirrorError::InvalidRoot(root.clone()))?;

        debug!(root = %root.display(), root_name, "Opened local tree");
        Ok(Self { root, root_name })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the mirrored root directory (first logical path segment)
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    fn entries(&self) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
    }

    /// Directories in pre-order, each with its sorted file names
    pub fn walk(&self) -> impl Iterator<Item = Result<DirListing, MirrorError>> + '_ {
        self.entries().filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => Some(self.listing(&entry)),
            Ok(_) => None,
            Err(e) => Some(Err(e.into())),
        })
    }

    fn listing(&self, dir: &DirEntry) -> Result<DirListing, MirrorError> {
        let relative = dir
            .path()
            .strip_prefix(&self.root)
            .map_err(|_| MirrorError::InvalidRoot(self.root.clone()))?;
        let logical = LogicalPath::from_relative(&self.root_name, relative)?;

        let mut files = Vec::new();
        for child in WalkDir::new(dir.path())
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let child = child?;
            if child.file_type().is_file() && !is_hidden(&child) {
                files.push(entry_name(&child)?);
            }
        }

        Ok(DirListing {
            path: dir.path().to_path_buf(),
            logical,
            files,
        })
    }

    /// Number of non-hidden regular files below the root
    pub fn count_files(&self) -> Result<u64, MirrorError> {
        let mut total = 0;
        for entry in self.entries() {
            if entry?.file_type().is_file() {
                total += 1;
            }
        }
        Ok(total)
    }

    /// Every non-hidden file and directory below the root, in walk order
    pub fn local_entries(&self) -> Result<Vec<LocalEntry>, MirrorError> {
        let mut entries = Vec::new();
        for entry in self.entries() {
            let entry = entry?;
            if entry.depth() == 0 {
                continue;
            }
            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                continue;
            };
            entries.push(LocalEntry {
                path: entry.path().to_path_buf(),
                kind,
                name: entry_name(&entry)?,
            });
        }
        Ok(entries)
    }

    /// Name-level inventory of [`local_entries`](Self::local_entries)
    pub fn inventory(&self) -> Result<Vec<InventoryEntry>, MirrorError> {
        let entries = self.local_entries()?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let parent = entry.path.parent();
                let parent_name = if parent == Some(self.root.as_path()) {
                    self.root_name.clone()
                } else {
                    parent
                        .and_then(Path::file_name)
                        .and_then(|n| n.to_str())
                        .unwrap_or_default()
                        .to_string()
                };
                InventoryEntry::new(entry.name, parent_name)
            })
            .collect())
    }
}
