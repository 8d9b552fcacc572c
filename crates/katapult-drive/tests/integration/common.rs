//! Shared test helpers for Drive API integration tests
//!
//! Each helper mounts the necessary mock endpoints on a wiremock server.
//! [`setup_drive_mock`] returns a store pointing at the mock server.

use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use katapult_drive::client::DriveClient;
use katapult_drive::provider::DriveRemoteStore;

pub const TOKEN: &str = "test-access-token";

/// Starts a mock server and returns a (MockServer, DriveRemoteStore) tuple.
pub async fn setup_drive_mock() -> (MockServer, DriveRemoteStore) {
    let server = MockServer::start().await;
    let store = DriveRemoteStore::new(DriveClient::with_base_url(TOKEN, server.uri()));
    (server, store)
}

/// A folder resource as Drive v2 returns it.
pub fn folder_json(id: &str, title: &str, parent: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": "drive#file",
        "id": id,
        "title": title,
        "mimeType": "application/vnd.google-apps.folder",
        "parents": [{"kind": "drive#parentReference", "id": parent}]
    })
}

/// A plain file resource as Drive v2 returns it.
pub fn file_json(id: &str, title: &str, parent: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": "drive#file",
        "id": id,
        "title": title,
        "mimeType": "application/octet-stream",
        "parents": [{"kind": "drive#parentReference", "id": parent}]
    })
}

/// Mounts a single-page listing of `parent`'s children.
pub async fn mount_list_single_page(
    server: &MockServer,
    parent: &str,
    items: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path("/drive/v2/files"))
        .and(query_param("q", format!("'{parent}' in parents")))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "drive#fileList",
            "items": items
        })))
        .mount(server)
        .await;
}

/// Mounts a two-page listing of `parent`'s children.
///
/// The first request (no `pageToken`) returns page 1 with a
/// `nextPageToken`; the request carrying that token returns page 2.
pub async fn mount_list_paginated(
    server: &MockServer,
    parent: &str,
    page1_items: serde_json::Value,
    page2_items: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path("/drive/v2/files"))
        .and(query_param("q", format!("'{parent}' in parents")))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": page1_items,
            "nextPageToken": "page-2-token"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v2/files"))
        .and(query_param("q", format!("'{parent}' in parents")))
        .and(query_param("pageToken", "page-2-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": page2_items
        })))
        .mount(server)
        .await;
}

/// Mounts a Drive error response for any request to `route`.
pub async fn mount_error(
    server: &MockServer,
    http_method: &str,
    route: &str,
    status: u16,
    reason: &str,
) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "error": {
                "code": status,
                "message": format!("{reason} message"),
                "errors": [{"domain": "global", "reason": reason, "message": "detail"}]
            }
        })))
        .mount(server)
        .await;
}

/// Mounts the opening of a resumable session whose URI carries `upload_id`.
pub async fn mount_upload_session(server: &MockServer, upload_id: &str, total: usize) {
    let location = format!(
        "{}/upload/drive/v2/files?uploadType=resumable&upload_id={upload_id}",
        server.uri()
    );
    Mock::given(method("POST"))
        .and(path("/upload/drive/v2/files"))
        .and(query_param("uploadType", "resumable"))
        .and(header("x-upload-content-length", total.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", location.as_str()))
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts the answer to the chunk `PUT` carrying `content_range`.
pub async fn mount_chunk(
    server: &MockServer,
    upload_id: &str,
    content_range: &str,
    response: ResponseTemplate,
) {
    Mock::given(method("PUT"))
        .and(path("/upload/drive/v2/files"))
        .and(query_param("upload_id", upload_id))
        .and(header("content-range", content_range))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// `308 Resume Incomplete` reporting bytes `0..=last` stored.
pub fn resume_incomplete(last: u64) -> ResponseTemplate {
    ResponseTemplate::new(308).insert_header("Range", format!("bytes=0-{last}").as_str())
}
