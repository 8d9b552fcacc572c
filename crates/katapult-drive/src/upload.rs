//! Upload operations for the Drive v2 API
//!
//! Provides functions for creating files with content:
//! - [`upload_file`] - Picks multipart or resumable by size
//! - [`upload_multipart`] - Single `multipart/related` request for small files
//! - [`upload_resumable`] - Resumable session sent in chunks
//! - [`create_upload_session`] - Opens a resumable session
//! - [`upload_chunk`] - Sends one byte range within a session
//!
//! ## Drive API References
//!
//! - [Multipart upload](https://developers.google.com/drive/api/guides/manage-uploads#multipart)
//! - [Resumable upload](https://developers.google.com/drive/api/guides/manage-uploads#resumable)

use katapult_core::domain::{RemoteId, RemoteNode};
use reqwest::header::{HeaderMap, LOCATION, RANGE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::client::DriveClient;
use crate::files::{DriveFile, ParentReference};
use crate::DriveError;

const UPLOAD_PATH: &str = "/upload/drive/v2/files";

/// Part delimiter of the `multipart/related` body
const BOUNDARY: &str = "katapult_multipart_boundary_7f3a9c";

/// Largest file sent as a single multipart request: 5 MiB
pub const RESUMABLE_THRESHOLD: usize = 5 * 1024 * 1024;

/// Chunk size for resumable uploads: 8 MiB
///
/// Drive requires every chunk but the last to be a multiple of 256 KiB.
/// 8 MiB = 256 KiB * 32.
pub const CHUNK_SIZE: usize = 8 * 1024 * 1024;

const CHUNK_ALIGNMENT: usize = 256 * 1024;

/// Metadata part of a multipart upload, or body of a session request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadMetadata<'a> {
    title: &'a str,
    parents: Vec<ParentReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

fn encode_metadata(
    title: &str,
    parent_id: &RemoteId,
    description: Option<&str>,
) -> Result<Vec<u8>, DriveError> {
    let metadata = UploadMetadata {
        title,
        parents: vec![ParentReference {
            id: parent_id.as_str().to_string(),
        }],
        description,
    };
    serde_json::to_vec(&metadata)
        .map_err(|e| DriveError::InvalidResponse(format!("Cannot encode metadata: {e}")))
}

/// Builds the `multipart/related` body for an upload
fn build_multipart_body(metadata_json: &[u8], data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata_json.len() + data.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata_json);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Uploads `data` as a new file, choosing the protocol by size
///
/// Content up to [`RESUMABLE_THRESHOLD`] goes in one multipart request.
/// Anything larger is sent through a resumable session in [`CHUNK_SIZE`]
/// chunks, so no second full-size copy of the content is built.
///
/// # Errors
/// Returns an error if any request fails or a response cannot be parsed
pub async fn upload_file(
    client: &DriveClient,
    title: &str,
    parent_id: &RemoteId,
    description: Option<&str>,
    data: &[u8],
) -> Result<RemoteNode, DriveError> {
    if data.len() > RESUMABLE_THRESHOLD {
        upload_resumable(client, title, parent_id, description, data, CHUNK_SIZE).await
    } else {
        upload_multipart(client, title, parent_id, description, data).await
    }
}

/// Uploads `data` as a new file titled `title` under `parent_id`
///
/// # Arguments
/// * `description` - Optional description stored on the file resource
///
/// # Errors
/// Returns an error if the request fails or the response cannot be parsed
pub async fn upload_multipart(
    client: &DriveClient,
    title: &str,
    parent_id: &RemoteId,
    description: Option<&str>,
    data: &[u8],
) -> Result<RemoteNode, DriveError> {
    let metadata_json = encode_metadata(title, parent_id, description)?;
    let body = build_multipart_body(&metadata_json, data);

    debug!(
        title,
        parent = %parent_id,
        bytes = data.len(),
        has_description = description.is_some(),
        "Uploading file"
    );

    let url = client.endpoint(UPLOAD_PATH, &[("uploadType", "multipart")])?;
    let file: DriveFile = client
        .send_json(
            client
                .request(Method::POST, url)
                .header(
                    "Content-Type",
                    format!("multipart/related; boundary={BOUNDARY}"),
                )
                .body(body),
        )
        .await?;

    debug!(title, id = %file.id, "Upload completed");
    file.into_remote_node()
}

/// Opens a resumable upload session for a file of `total` bytes
///
/// Uses `POST /upload/drive/v2/files?uploadType=resumable` with the file
/// metadata as the JSON body.
///
/// # Returns
/// The session URI from the `Location` header
///
/// # Errors
/// Returns an error if the request fails or the response has no usable
/// `Location` header
pub async fn create_upload_session(
    client: &DriveClient,
    title: &str,
    parent_id: &RemoteId,
    description: Option<&str>,
    total: u64,
) -> Result<Url, DriveError> {
    let metadata_json = encode_metadata(title, parent_id, description)?;
    let url = client.endpoint(UPLOAD_PATH, &[("uploadType", "resumable")])?;
    debug!(title, parent = %parent_id, bytes = total, "Creating upload session");

    let response = client
        .send(
            client
                .request(Method::POST, url)
                .header("Content-Type", "application/json; charset=UTF-8")
                .header("X-Upload-Content-Type", "application/octet-stream")
                .header("X-Upload-Content-Length", total.to_string())
                .body(metadata_json),
        )
        .await?;

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            DriveError::InvalidResponse("Upload session response has no Location header".into())
        })?;
    Url::parse(location)
        .map_err(|e| DriveError::InvalidResponse(format!("Invalid upload session URI: {e}")))
}

/// Result of sending one chunk to a resumable session
#[derive(Debug)]
pub enum ChunkOutcome {
    /// `308 Resume Incomplete`: the session holds bytes up to `next_offset`
    Incomplete { next_offset: u64 },
    /// The final chunk was accepted and the file created
    Complete(DriveFile),
}

/// Sends `data` as the byte range starting at `offset` of a `total`-byte file
///
/// # Errors
/// Returns an error if the chunk is rejected or the final response cannot
/// be parsed
pub async fn upload_chunk(
    client: &DriveClient,
    session: &Url,
    data: &[u8],
    offset: u64,
    total: u64,
) -> Result<ChunkOutcome, DriveError> {
    let range_end = (offset + data.len() as u64).saturating_sub(1);
    let content_range = format!("bytes {offset}-{range_end}/{total}");
    debug!(range = %content_range, "Uploading chunk");

    let response = client
        .send_allowing(
            client
                .request(Method::PUT, session.clone())
                .header("Content-Range", &content_range)
                .body(data.to_vec()),
            StatusCode::PERMANENT_REDIRECT,
        )
        .await?;

    if response.status() == StatusCode::PERMANENT_REDIRECT {
        let next_offset = persisted_end(response.headers()).map_or(0, |end| end + 1);
        debug!(next_offset, "Chunk accepted");
        return Ok(ChunkOutcome::Incomplete { next_offset });
    }

    let bytes = response.bytes().await?;
    let file = serde_json::from_slice(&bytes)
        .map_err(|e| DriveError::InvalidResponse(format!("Malformed JSON body: {e}")))?;
    Ok(ChunkOutcome::Complete(file))
}

/// Last byte the session has stored, from a `Range: bytes=0-N` header
fn persisted_end(headers: &HeaderMap) -> Option<u64> {
    let range = headers.get(RANGE)?.to_str().ok()?;
    let (_, end) = range.strip_prefix("bytes=")?.split_once('-')?;
    end.trim().parse().ok()
}

/// Uploads `data` through a resumable session in `chunk_size` pieces
///
/// `chunk_size` is rounded down to a multiple of 256 KiB, and is at least
/// 256 KiB. After each `308` the next chunk starts where the session says
/// its stored bytes end.
///
/// # Errors
/// Returns an error if the session cannot be opened, a chunk fails, or the
/// session stops making progress
pub async fn upload_resumable(
    client: &DriveClient,
    title: &str,
    parent_id: &RemoteId,
    description: Option<&str>,
    data: &[u8],
    chunk_size: usize,
) -> Result<RemoteNode, DriveError> {
    let chunk_size = (chunk_size / CHUNK_ALIGNMENT).max(1) * CHUNK_ALIGNMENT;
    let total = data.len() as u64;
    info!(
        title,
        bytes = total,
        chunks = data.len().div_ceil(chunk_size),
        "Starting resumable upload"
    );

    let session = create_upload_session(client, title, parent_id, description, total).await?;

    let mut offset = 0;
    while offset < data.len() {
        let end = (offset + chunk_size).min(data.len());
        let outcome = upload_chunk(client, &session, &data[offset..end], offset as u64, total)
            .await?;

        match outcome {
            ChunkOutcome::Complete(file) => {
                info!(title, id = %file.id, bytes = total, "Resumable upload completed");
                return file.into_remote_node();
            }
            ChunkOutcome::Incomplete { next_offset } => {
                let next = usize::try_from(next_offset).unwrap_or(usize::MAX);
                if next <= offset || next > end {
                    return Err(DriveError::InvalidResponse(format!(
                        "Upload session stored {next_offset} bytes after a chunk ending at {end}"
                    )));
                }
                offset = next;
            }
        }
    }

    Err(DriveError::InvalidResponse(format!(
        "Upload session for {title} ended without a file resource"
    )))
}
