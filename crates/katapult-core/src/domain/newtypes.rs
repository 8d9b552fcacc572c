//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for remote identifiers and mirror-relative paths.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// RemoteId
// ============================================================================

/// Opaque identifier assigned by the remote store
///
/// The remote store is the only authority for ids; they are never derived
/// locally. Drive ids are alphanumeric with `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Alias the store accepts for the top-level folder of the account
    pub const DRIVE_ROOT: &'static str = "root";

    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains characters outside the
    /// store's id alphabet
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidRemoteId(format!(
                "Remote ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// The account's top-level folder
    #[must_use]
    pub fn drive_root() -> Self {
        Self(Self::DRIVE_ROOT.to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

// ============================================================================
// LogicalPath
// ============================================================================

/// Mirror-relative path of a local directory or file
///
/// The first segment is the name of the mirrored root directory, so the
/// root itself is `Archive` and a nested folder is `Archive/1999/March`.
/// Separators are always `/` regardless of the host platform; this is the
/// key of the directory cache. A `\` is an ordinary name character; host
/// separators are resolved by [`from_relative`](Self::from_relative).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalPath(String);

impl LogicalPath {
    /// Create a new LogicalPath from a `/`-separated string
    ///
    /// # Errors
    /// Returns error for empty paths, leading/trailing or doubled
    /// separators, and `.`/`..` segments
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();

        if path.is_empty() {
            return Err(DomainError::InvalidPath(
                "Logical path cannot be empty".to_string(),
            ));
        }

        if path.starts_with('/') || path.ends_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "Logical path must be root-relative: {path}"
            )));
        }

        for segment in path.split('/') {
            if segment.is_empty() {
                return Err(DomainError::InvalidPath(format!(
                    "Logical path contains an empty segment: {path}"
                )));
            }
            if segment == "." || segment == ".." {
                return Err(DomainError::InvalidPath(format!(
                    "Logical path contains invalid traversal: {path}"
                )));
            }
        }

        Ok(Self(path))
    }

    /// Build the logical path of `relative` below a mirror root named `root_name`
    ///
    /// An empty `relative` yields the root itself.
    ///
    /// # Errors
    /// Returns error if `relative` is absolute, escapes the root, or is not
    /// valid UTF-8
    pub fn from_relative(root_name: &str, relative: &Path) -> Result<Self, DomainError> {
        let mut joined = Self::new(root_name)?;
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        DomainError::InvalidPath(format!(
                            "Path is not valid UTF-8: {}",
                            relative.display()
                        ))
                    })?;
                    joined = joined.join(part)?;
                }
                Component::CurDir => continue,
                Component::RootDir | Component::ParentDir | Component::Prefix(_) => {
                    return Err(DomainError::InvalidPath(format!(
                        "Path is not relative to the mirror root: {}",
                        relative.display()
                    )));
                }
            }
        }
        Ok(joined)
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a single path component
    ///
    /// # Errors
    /// Returns error if the component is empty, contains a separator, or is
    /// a traversal segment
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        if component.is_empty()
            || component.contains('/')
            || component == "."
            || component == ".."
        {
            return Err(DomainError::InvalidPath(format!(
                "Invalid path component: {component}"
            )));
        }

        Ok(Self(format!("{}/{component}", self.0)))
    }

    /// Get the parent path (`None` for the mirror root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rfind('/')
            .map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Get the last segment
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Number of segments (1 for the mirror root)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.split('/').count()
    }

    /// Whether this is the mirror root (a single segment)
    #[must_use]
    pub fn is_root(&self) -> bool {
        !self.0.contains('/')
    }
}

impl Display for LogicalPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LogicalPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LogicalPath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<LogicalPath> for String {
    fn from(path: LogicalPath) -> Self {
        path.0
    }
}
