//! Katapult Drive - Google Drive v2 REST adapter
//!
//! Provides an async client for the subset of the Drive v2 files API the
//! mirror needs:
//! - Paginated listing of a folder's children
//! - Folder creation (with an optional color)
//! - File upload with metadata, multipart or resumable by size
//! - Description patches
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP client and error-body decoding
//! - [`files`] - Listing, folder creation and patch endpoints
//! - [`upload`] - Multipart and resumable uploads
//! - [`provider`] - [`IRemoteStore`](katapult_core::ports::IRemoteStore) implementation

pub mod client;
pub mod files;
pub mod provider;
pub mod upload;

use katapult_core::ports::RemoteError;
use thiserror::Error;

/// Errors that can occur when communicating with the Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request or user rate limit exceeded (429, or 403 with a rate-limit reason)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// A server-side error occurred (5xx)
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<DriveError> for RemoteError {
    fn from(err: DriveError) -> Self {
        match err {
            DriveError::RateLimited(reason) => RemoteError::RateLimited(reason),
            DriveError::ServerError { status, message } => RemoteError::Server { status, message },
            DriveError::NetworkError(e) => {
                // Undecodable bodies are response errors, not transport faults
                if e.is_decode() {
                    RemoteError::InvalidResponse(e.to_string())
                } else {
                    RemoteError::Network(e.to_string())
                }
            }
            DriveError::InvalidResponse(msg) => RemoteError::InvalidResponse(msg),
            DriveError::Unauthorized(message) => RemoteError::Rejected {
                status: 401,
                message,
            },
            DriveError::Forbidden(message) => RemoteError::Rejected {
                status: 403,
                message,
            },
            DriveError::NotFound(message) => RemoteError::Rejected {
                status: 404,
                message,
            },
            DriveError::Http { status, message } => RemoteError::Rejected { status, message },
        }
    }
}
