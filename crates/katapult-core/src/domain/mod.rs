//! Domain entities and value types
//!
//! - Newtypes for validated identifiers and logical paths
//! - Remote and local node descriptions
//! - Upload progress accounting
//! - Metadata records attached to uploaded files
//! - Domain-specific error types

pub mod errors;
pub mod metadata;
pub mod newtypes;
pub mod node;
pub mod progress;

// Re-export commonly used types
pub use errors::DomainError;
pub use metadata::MetadataRecord;
pub use newtypes::*;
pub use node::{EntryKind, InventoryEntry, LocalEntry, NodeKind, RemoteNode};
pub use progress::UploadCounter;
