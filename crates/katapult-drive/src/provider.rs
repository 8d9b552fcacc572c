//! DriveRemoteStore - IRemoteStore implementation for the Drive v2 API
//!
//! Wraps the [`DriveClient`] and delegates to the files and upload modules
//! to fulfil the [`IRemoteStore`] port contract.
//!
//! ## Design Notes
//!
//! - No retries happen here; the mirror's retry executor wraps every call
//!   and classifies failures through [`RemoteError::is_transient`].
//! - Node creation only supports folders. Files go through `upload_file`.

use katapult_core::domain::{NodeKind, RemoteId, RemoteNode};
use katapult_core::ports::{ChildPage, FileUpload, IRemoteStore, NewNode, RemoteError};
use tracing::debug;

use crate::client::DriveClient;
use crate::{files, upload};

/// Remote store backed by Google Drive
pub struct DriveRemoteStore {
    client: DriveClient,
}

impl DriveRemoteStore {
    /// Creates a new `DriveRemoteStore` wrapping the given [`DriveClient`]
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }

    /// Returns the wrapped client
    pub fn client(&self) -> &DriveClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DriveRemoteStore {
    async fn list_children(
        &self,
        parent_id: &RemoteId,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<ChildPage, RemoteError> {
        debug!(parent = %parent_id, page_size, "DriveRemoteStore::list_children");
        Ok(files::list_children(&self.client, parent_id, page_token, page_size).await?)
    }

    /// Creates a folder
    ///
    /// Drive has no way to create an empty non-folder node through this
    /// endpoint, so `NodeKind::File` is rejected.
    async fn create_node(&self, node: &NewNode) -> Result<RemoteNode, RemoteError> {
        debug!(
            title = %node.title,
            parent = %node.parent_id,
            color = ?node.color_tag,
            "DriveRemoteStore::create_node"
        );
        if node.kind != NodeKind::Folder {
            return Err(RemoteError::Rejected {
                status: 400,
                message: format!("Only folders can be created directly: {}", node.title),
            });
        }
        Ok(files::create_folder(
            &self.client,
            &node.title,
            &node.parent_id,
            node.color_tag.as_deref(),
        )
        .await?)
    }

    async fn upload_file(&self, file: &FileUpload) -> Result<RemoteNode, RemoteError> {
        debug!(
            title = %file.title,
            parent = %file.parent_id,
            size = file.data.len(),
            "DriveRemoteStore::upload_file"
        );
        Ok(upload::upload_file(
            &self.client,
            &file.title,
            &file.parent_id,
            file.description.as_deref(),
            &file.data,
        )
        .await?)
    }

    async fn patch_description(
        &self,
        id: &RemoteId,
        description: &str,
    ) -> Result<RemoteNode, RemoteError> {
        debug!(id = %id, "DriveRemoteStore::patch_description");
        Ok(files::patch_description(&self.client, id, description).await?)
    }
}
