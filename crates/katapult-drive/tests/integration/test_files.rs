//! Integration tests for listing, folder creation and description patches

use katapult_core::domain::{NodeKind, RemoteId};
use katapult_core::ports::{IRemoteStore, NewNode};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_children_single_page() {
    let (server, store) = common::setup_drive_mock().await;
    common::mount_list_single_page(
        &server,
        "root",
        serde_json::json!([
            common::folder_json("f-1", "Archive", "root"),
            common::file_json("x-1", "notes.txt", "root"),
        ]),
    )
    .await;

    let page = store
        .list_children(&RemoteId::drive_root(), None, 1000)
        .await
        .expect("listing failed");

    assert!(page.next_page_token.is_none());
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].title, "Archive");
    assert_eq!(page.items[0].kind, NodeKind::Folder);
    assert_eq!(page.items[1].title, "notes.txt");
    assert_eq!(page.items[1].kind, NodeKind::File);
    assert_eq!(page.items[1].parent_id, Some(RemoteId::drive_root()));
}

#[tokio::test]
async fn test_list_children_sends_page_size() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/drive/v2/files"))
        .and(query_param("maxResults", "25"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = store
        .list_children(&RemoteId::new("abc").unwrap(), None, 25)
        .await
        .expect("listing failed");
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_list_children_follows_page_token() {
    let (server, store) = common::setup_drive_mock().await;
    common::mount_list_paginated(
        &server,
        "parent-1",
        serde_json::json!([common::file_json("a", "a.txt", "parent-1")]),
        serde_json::json!([common::file_json("b", "b.txt", "parent-1")]),
    )
    .await;

    let parent = RemoteId::new("parent-1").unwrap();
    let first = store.list_children(&parent, None, 1).await.unwrap();
    assert_eq!(first.items[0].title, "a.txt");
    let token = first.next_page_token.expect("expected a continuation token");
    assert_eq!(token, "page-2-token");

    let second = store
        .list_children(&parent, Some(&token), 1)
        .await
        .unwrap();
    assert_eq!(second.items[0].title, "b.txt");
    assert!(second.next_page_token.is_none());
}

#[tokio::test]
async fn test_list_children_empty_token_is_last_page() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/drive/v2/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [],
            "nextPageToken": ""
        })))
        .mount(&server)
        .await;

    let page = store
        .list_children(&RemoteId::drive_root(), None, 10)
        .await
        .unwrap();
    assert!(page.next_page_token.is_none());
}

// ============================================================================
// Folder creation
// ============================================================================

#[tokio::test]
async fn test_create_folder_sends_mime_and_parent() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/drive/v2/files"))
        .and(body_partial_json(serde_json::json!({
            "title": "1999",
            "mimeType": "application/vnd.google-apps.folder",
            "parents": [{"id": "parent-1"}],
            "folderColorRgb": "#ff7537"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::folder_json("new-folder", "1999", "parent-1")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let node = NewNode::folder("1999", RemoteId::new("parent-1").unwrap())
        .with_color(Some("#ff7537".to_string()));
    let created = store.create_node(&node).await.expect("create failed");

    assert_eq!(created.id.as_str(), "new-folder");
    assert!(created.is_folder());
    assert_eq!(created.parent_id.unwrap().as_str(), "parent-1");
}

#[tokio::test]
async fn test_create_folder_without_color_omits_field() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/drive/v2/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::folder_json("f-2", "March", "root")),
        )
        .mount(&server)
        .await;

    let node = NewNode::folder("March", RemoteId::drive_root());
    store.create_node(&node).await.expect("create failed");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("folderColorRgb").is_none());
}

// ============================================================================
// Description patch
// ============================================================================

#[tokio::test]
async fn test_patch_description() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("PATCH"))
        .and(path("/drive/v2/files/file-45"))
        .and(body_partial_json(serde_json::json!({ "description": "Date: 1945" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "file-45",
            "title": "45.jpg",
            "mimeType": "image/jpeg",
            "description": "Date: 1945"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let node = store
        .patch_description(&RemoteId::new("file-45").unwrap(), "Date: 1945")
        .await
        .expect("patch failed");
    assert_eq!(node.description.as_deref(), Some("Date: 1945"));
}
