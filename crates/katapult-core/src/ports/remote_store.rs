//! Remote store port (driven/secondary port)
//!
//! The interface the mirror engine uses to read and grow a hierarchical
//! remote store of folders and files addressed by opaque ids. The Drive v2
//! adapter is the production implementation; tests use in-memory fakes.
//!
//! ## Design Notes
//!
//! - Errors are returned as [`RemoteError`], which carries the transient
//!   versus fatal classification used by the retry executor.
//! - Uses `#[async_trait]` for async trait methods.
//! - Calls are independent and stateless from the caller's point of view;
//!   the adapter owns connection pooling and authentication.

use thiserror::Error;

use crate::domain::newtypes::RemoteId;
use crate::domain::node::{NodeKind, RemoteNode};

// ============================================================================
// RemoteError
// ============================================================================

/// Failure reported by a remote store operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response (connect, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The store asked the client to slow down
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Server-side failure (5xx)
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Request refused for a reason retrying will not fix
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Whether the failure is likely to succeed on retry
    ///
    /// Network failures, rate limiting and 5xx responses are transient.
    /// Everything else is fatal.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited(_) | Self::Server { .. }
        )
    }
}

// ============================================================================
// Request/response DTOs
// ============================================================================

/// One page of a folder listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildPage {
    /// Children in server order
    pub items: Vec<RemoteNode>,
    /// Continuation token, `None` on the last page
    pub next_page_token: Option<String>,
}

/// Description of a node to create (folders in practice)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub title: String,
    pub kind: NodeKind,
    pub parent_id: RemoteId,
    pub color_tag: Option<String>,
}

impl NewNode {
    /// A folder under `parent_id`
    #[must_use]
    pub fn folder(title: impl Into<String>, parent_id: RemoteId) -> Self {
        Self {
            title: title.into(),
            kind: NodeKind::Folder,
            parent_id,
            color_tag: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color_tag = color;
        self
    }
}

/// A file upload: metadata plus content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub title: String,
    pub parent_id: RemoteId,
    pub description: Option<String>,
    pub data: Vec<u8>,
}

// ============================================================================
// IRemoteStore trait
// ============================================================================

/// Port trait for hierarchical remote store operations
///
/// ## Implementation Notes
///
/// - Implementations do not retry; callers wrap calls in the retry executor
///   and rely on [`RemoteError::is_transient`] to decide.
/// - `list_children` returns one page; callers follow `next_page_token`.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists one page of the children of a folder
    ///
    /// # Arguments
    /// * `parent_id` - Folder whose children are listed
    /// * `page_token` - Continuation token from the previous page, `None` for the first
    /// * `page_size` - Page size hint; the store may return fewer items
    async fn list_children(
        &self,
        parent_id: &RemoteId,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<ChildPage, RemoteError>;

    /// Creates a node (folder) and returns it with its store-assigned id
    async fn create_node(&self, node: &NewNode) -> Result<RemoteNode, RemoteError>;

    /// Uploads a file into a folder
    async fn upload_file(&self, upload: &FileUpload) -> Result<RemoteNode, RemoteError>;

    /// Replaces the description of an existing node
    async fn patch_description(
        &self,
        id: &RemoteId,
        description: &str,
    ) -> Result<RemoteNode, RemoteError>;
}
