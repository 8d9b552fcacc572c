//! Drive v2 `files` endpoints
//!
//! - [`list_children`] - One page of `GET /drive/v2/files?q='{id}' in parents`
//! - [`create_folder`] - `POST /drive/v2/files` with the folder MIME type
//! - [`patch_description`] - `PATCH /drive/v2/files/{id}`
//!
//! ## Drive API References
//!
//! - [Files: list](https://developers.google.com/drive/api/v2/reference/files/list)
//! - [Files: insert](https://developers.google.com/drive/api/v2/reference/files/insert)
//! - [Files: patch](https://developers.google.com/drive/api/v2/reference/files/patch)

use katapult_core::domain::{NodeKind, RemoteId, RemoteNode};
use katapult_core::ports::ChildPage;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::DriveClient;
use crate::DriveError;

/// MIME type Drive uses to mark a file resource as a folder
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

const FILES_PATH: &str = "/drive/v2/files";

// ============================================================================
// Drive v2 resource types
// ============================================================================

/// A `File` resource as returned by Drive v2
///
/// Only the fields the mirror reads are mapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub parents: Vec<ParentReference>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder_color_rgb: Option<String>,
}

/// Reference to a parent folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentReference {
    pub id: String,
}

/// Response of `files.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    items: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Body of `files.insert` for a folder
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderInsert<'a> {
    title: &'a str,
    mime_type: &'a str,
    parents: Vec<ParentReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_color_rgb: Option<&'a str>,
}

// ============================================================================
// DriveFile -> RemoteNode conversion
// ============================================================================

impl DriveFile {
    /// Whether the resource is a folder
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }

    /// Converts the resource into the port-level [`RemoteNode`]
    ///
    /// Only the first parent is kept; the mirror never creates multi-parent
    /// nodes.
    pub fn into_remote_node(self) -> Result<RemoteNode, DriveError> {
        let kind = if self.is_folder() {
            NodeKind::Folder
        } else {
            NodeKind::File
        };
        let id = RemoteId::new(self.id)
            .map_err(|e| DriveError::InvalidResponse(format!("Bad file id: {e}")))?;
        let parent_id = self
            .parents
            .into_iter()
            .next()
            .map(|p| RemoteId::new(p.id))
            .transpose()
            .map_err(|e| DriveError::InvalidResponse(format!("Bad parent id: {e}")))?;

        Ok(RemoteNode {
            id,
            title: self.title,
            kind,
            parent_id,
            color_tag: self.folder_color_rgb,
            description: self.description,
        })
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Lists one page of the children of `parent_id`
///
/// # Arguments
/// * `page_token` - `nextPageToken` of the previous page, `None` for the first
/// * `page_size` - `maxResults` hint
pub async fn list_children(
    client: &DriveClient,
    parent_id: &RemoteId,
    page_token: Option<&str>,
    page_size: u32,
) -> Result<ChildPage, DriveError> {
    let q = format!("'{}' in parents", parent_id.as_str());
    let max_results = page_size.to_string();
    let mut query = vec![("q", q.as_str()), ("maxResults", max_results.as_str())];
    if let Some(token) = page_token {
        query.push(("pageToken", token));
    }

    debug!(parent = %parent_id, has_token = page_token.is_some(), "Listing children");
    let url = client.endpoint(FILES_PATH, &query)?;
    let list: FileList = client.send_json(client.request(Method::GET, url)).await?;

    let items = list
        .items
        .into_iter()
        .map(DriveFile::into_remote_node)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        parent = %parent_id,
        count = items.len(),
        more = list.next_page_token.is_some(),
        "Listed page"
    );

    Ok(ChildPage {
        items,
        next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
    })
}

/// Creates a folder titled `title` under `parent_id`
pub async fn create_folder(
    client: &DriveClient,
    title: &str,
    parent_id: &RemoteId,
    color: Option<&str>,
) -> Result<RemoteNode, DriveError> {
    let body = FolderInsert {
        title,
        mime_type: FOLDER_MIME_TYPE,
        parents: vec![ParentReference {
            id: parent_id.as_str().to_string(),
        }],
        folder_color_rgb: color,
    };

    let url = client.endpoint(FILES_PATH, &[])?;
    let file: DriveFile = client
        .send_json(client.request(Method::POST, url).json(&body))
        .await?;
    debug!(title, id = %file.id, "Created folder");
    file.into_remote_node()
}

/// Replaces the description of `id`
pub async fn patch_description(
    client: &DriveClient,
    id: &RemoteId,
    description: &str,
) -> Result<RemoteNode, DriveError> {
    let url = client.endpoint(&format!("{FILES_PATH}/{}", id.as_str()), &[])?;
    let body = serde_json::json!({ "description": description });
    let file: DriveFile = client
        .send_json(client.request(Method::PATCH, url).json(&body))
        .await?;
    debug!(id = %file.id, "Patched description");
    file.into_remote_node()
}
