//! Remote directory cache
//!
//! Maps the logical path of every local directory to the id of its remote
//! folder. A path is present only once its folder is known to exist
//! remotely, either because this run created it or because it was found.
//! Entries are never removed.
//!
//! ## File format
//!
//! One `path,id` pair per line. Lines split on the last comma: remote ids
//! never contain commas, directory names may. In the path, `\` is written
//! as `\\`, a line feed as `\n` and a carriage return as `\r`. Blank lines
//! are skipped.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use katapult_core::domain::{LogicalPath, RemoteId};
use tracing::{debug, info};

use crate::MirrorError;

/// Path-to-id cache owned by a single mirror driver
#[derive(Debug, Clone)]
pub struct DirectoryCache {
    path: PathBuf,
    entries: HashMap<LogicalPath, RemoteId>,
}

impl DirectoryCache {
    /// An empty cache that will persist to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: HashMap::new(),
        }
    }

    /// Load the cache file at `path`, or start empty if it does not exist
    ///
    /// # Errors
    /// Returns `MirrorError::CorruptCache` for a line that is not `path,id`
    pub fn restore(path: impl Into<PathBuf>) -> Result<Self, MirrorError> {
        let path = path.into();
        let mut cache = Self::empty(&path);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No cache file, starting empty");
                return Ok(cache);
            }
            Err(e) => return Err(e.into()),
        };

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let corrupt = |reason: String| MirrorError::CorruptCache {
                path: path.clone(),
                line: idx + 1,
                reason,
            };

            let (logical, id) = line
                .rsplit_once(',')
                .ok_or_else(|| corrupt("expected 'path,id'".to_string()))?;
            let logical = unescape(logical).ok_or_else(|| corrupt("invalid escape".to_string()))?;
            let logical = LogicalPath::new(logical).map_err(|e| corrupt(e.to_string()))?;
            let id = RemoteId::new(id.trim()).map_err(|e| corrupt(e.to_string()))?;
            cache.record(logical, id).map_err(|e| corrupt(e.to_string()))?;
        }

        info!(path = %path.display(), entries = cache.len(), "Restored directory cache");
        Ok(cache)
    }

    /// Id of the remote folder for `path`, if known
    pub fn lookup(&self, path: &LogicalPath) -> Option<&RemoteId> {
        self.entries.get(path)
    }

    /// Record that `path` is backed by remote folder `id`
    ///
    /// Re-recording the same id is a no-op.
    ///
    /// # Errors
    /// Returns `MirrorError::DuplicatePath` if `path` already maps to a
    /// different id
    pub fn record(&mut self, path: LogicalPath, id: RemoteId) -> Result<(), MirrorError> {
        match self.entries.get(&path) {
            Some(existing) if *existing == id => Ok(()),
            Some(existing) => Err(MirrorError::DuplicatePath {
                existing: existing.clone(),
                path,
                new: id,
            }),
            None => {
                self.entries.insert(path, id);
                Ok(())
            }
        }
    }

    /// Write the whole cache to its file
    ///
    /// The content goes to a sibling temporary file first and is renamed
    /// over the cache file, so a crash never leaves a truncated cache.
    pub fn persist(&self) -> Result<(), MirrorError> {
        let mut lines: Vec<(&LogicalPath, &RemoteId)> = self.entries.iter().collect();
        lines.sort();

        let tmp = temp_sibling(&self.path);
        {
            let mut file = fs::File::create(&tmp)?;
            for (logical, id) in lines {
                writeln!(file, "{},{id}", escape(logical.as_str()))?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        info!(path = %self.path.display(), entries = self.len(), "Persisted directory cache");
        Ok(())
    }

    /// File the cache persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&LogicalPath, &RemoteId)> {
        self.entries.iter()
    }
}

fn escape(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`]; `None` on a dangling or unknown escape
fn unescape(field: &str) -> Option<String> {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
