//! Katapult Core - Domain types, ports and configuration
//!
//! This crate contains the hexagonal core shared by every other crate:
//! - **Domain types** - `LogicalPath`, `RemoteId`, `RemoteNode`, `UploadCounter`,
//!   `InventoryEntry`, `MetadataRecord`
//! - **Port definitions** - `IRemoteStore`, the contract the mirror engine
//!   drives and the Drive adapter implements
//! - **Configuration** - YAML-backed settings with validation and a builder
//!
//! # Architecture
//!
//! The domain module has no I/O. Ports define the trait boundary to the
//! remote store; adapter crates implement them and the mirror crate
//! orchestrates domain values through them.

pub mod config;
pub mod domain;
pub mod ports;
