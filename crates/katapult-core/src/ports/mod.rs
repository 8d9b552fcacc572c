//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the traits the mirror engine depends on; their
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Hierarchical remote object store (Drive v2, test fakes)

pub mod remote_store;

pub use remote_store::{ChildPage, FileUpload, IRemoteStore, NewNode, RemoteError};
