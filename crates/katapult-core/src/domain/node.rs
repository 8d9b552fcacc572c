//! Remote and local node descriptions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::newtypes::RemoteId;

/// Kind of a node in the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Folder,
    File,
}

impl NodeKind {
    /// Whether this is a folder
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }
}

/// Kind of a local filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Directory,
    File,
}

/// A node as reported by the remote store
///
/// Titles are not unique within a parent. Callers resolving a child by
/// title take the first match in the order the store returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub id: RemoteId,
    pub title: String,
    pub kind: NodeKind,
    pub parent_id: Option<RemoteId>,
    pub color_tag: Option<String>,
    pub description: Option<String>,
}

impl RemoteNode {
    /// Create a bare node with no parent, color or description
    #[must_use]
    pub fn new(id: RemoteId, title: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            title: title.into(),
            kind,
            parent_id: None,
            color_tag: None,
            description: None,
        }
    }

    /// Set the parent folder
    #[must_use]
    pub fn with_parent(mut self, parent_id: RemoteId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the folder color tag
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color_tag = Some(color.into());
        self
    }

    /// Whether this node is a folder
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }
}

/// An entry found while walking the local tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub name: String,
}

/// A name-level record used by reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub name: String,
    pub parent_name: String,
    pub color_tag: Option<String>,
}

impl InventoryEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, parent_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_name: parent_name.into(),
            color_tag: None,
        }
    }
}
