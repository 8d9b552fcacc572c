//! Integration tests for multipart and resumable uploads

use katapult_core::domain::{NodeKind, RemoteId};
use katapult_core::ports::{FileUpload, IRemoteStore, RemoteError};
use katapult_drive::client::DriveClient;
use katapult_drive::upload::{self, RESUMABLE_THRESHOLD};
use katapult_drive::DriveError;
use wiremock::matchers::{body_string_contains, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_upload_sends_multipart_related() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v2/files"))
        .and(query_param("uploadType", "multipart"))
        .and(header_regex("content-type", "^multipart/related; boundary=.+$"))
        .and(body_string_contains(r#""title":"report.pdf""#))
        .and(body_string_contains("file body bytes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::file_json("up-1", "report.pdf", "dir-1")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let upload = FileUpload {
        title: "report.pdf".into(),
        parent_id: RemoteId::new("dir-1").unwrap(),
        description: None,
        data: b"file body bytes".to_vec(),
    };
    let node = store.upload_file(&upload).await.expect("upload failed");

    assert_eq!(node.id.as_str(), "up-1");
    assert_eq!(node.kind, NodeKind::File);
    assert_eq!(node.parent_id.unwrap().as_str(), "dir-1");
}

#[tokio::test]
async fn test_upload_carries_description() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v2/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "up-2",
            "title": "2020_03_report.pdf",
            "mimeType": "application/pdf",
            "description": "Date: 2020\n\nTitle: Report\n\nDescription: Q1"
        })))
        .mount(&server)
        .await;

    let upload = FileUpload {
        title: "2020_03_report.pdf".into(),
        parent_id: RemoteId::drive_root(),
        description: Some("Date: 2020\n\nTitle: Report\n\nDescription: Q1".into()),
        data: vec![1, 2, 3],
    };
    store.upload_file(&upload).await.expect("upload failed");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#""description":"Date: 2020\n\nTitle: Report\n\nDescription: Q1""#));
    assert!(body.contains(r#""parents":[{"id":"root"}]"#));
}

const CHUNK: usize = 256 * 1024;

fn client(server: &MockServer) -> DriveClient {
    DriveClient::with_base_url(common::TOKEN, server.uri())
}

#[tokio::test]
async fn test_resumable_upload_sends_chunks_in_order() {
    let server = MockServer::start().await;
    let data = vec![7u8; 600_000];
    common::mount_upload_session(&server, "sess-1", data.len()).await;
    common::mount_chunk(
        &server,
        "sess-1",
        "bytes 0-262143/600000",
        common::resume_incomplete(262_143),
    )
    .await;
    common::mount_chunk(
        &server,
        "sess-1",
        "bytes 262144-524287/600000",
        common::resume_incomplete(524_287),
    )
    .await;
    common::mount_chunk(
        &server,
        "sess-1",
        "bytes 524288-599999/600000",
        ResponseTemplate::new(200).set_body_json(common::file_json("big-1", "tape.wav", "dir-1")),
    )
    .await;

    let node = upload::upload_resumable(
        &client(&server),
        "tape.wav",
        &RemoteId::new("dir-1").unwrap(),
        Some("Date: 1999"),
        &data,
        CHUNK,
    )
    .await
    .expect("resumable upload failed");

    assert_eq!(node.id.as_str(), "big-1");
    assert_eq!(node.kind, NodeKind::File);

    let requests = server.received_requests().await.unwrap();
    let session = String::from_utf8_lossy(&requests[0].body);
    assert!(session.contains(r#""title":"tape.wav""#));
    assert!(session.contains(r#""parents":[{"id":"dir-1"}]"#));
    assert!(session.contains(r#""description":"Date: 1999""#));
    let sent: usize = requests[1..].iter().map(|r| r.body.len()).sum();
    assert_eq!(sent, data.len());
}

#[tokio::test]
async fn test_resumable_upload_resends_unstored_bytes() {
    let server = MockServer::start().await;
    let data = vec![1u8; 300_000];
    common::mount_upload_session(&server, "sess-2", data.len()).await;
    // Only half of the first chunk reached storage
    common::mount_chunk(
        &server,
        "sess-2",
        "bytes 0-262143/300000",
        common::resume_incomplete(131_071),
    )
    .await;
    common::mount_chunk(
        &server,
        "sess-2",
        "bytes 131072-299999/300000",
        ResponseTemplate::new(201).set_body_json(common::file_json("big-2", "a.bin", "root")),
    )
    .await;

    let node = upload::upload_resumable(
        &client(&server),
        "a.bin",
        &RemoteId::drive_root(),
        None,
        &data,
        CHUNK,
    )
    .await
    .expect("resumable upload failed");
    assert_eq!(node.id.as_str(), "big-2");
}

#[tokio::test]
async fn test_resumable_upload_stalled_session_is_an_error() {
    let server = MockServer::start().await;
    let data = vec![1u8; 300_000];
    common::mount_upload_session(&server, "sess-3", data.len()).await;
    common::mount_chunk(
        &server,
        "sess-3",
        "bytes 0-262143/300000",
        ResponseTemplate::new(308),
    )
    .await;

    let err = upload::upload_resumable(
        &client(&server),
        "a.bin",
        &RemoteId::drive_root(),
        None,
        &data,
        CHUNK,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DriveError::InvalidResponse(_)), "{err}");
}

#[tokio::test]
async fn test_resumable_chunk_server_error_is_transient() {
    let server = MockServer::start().await;
    let data = vec![1u8; 300_000];
    common::mount_upload_session(&server, "sess-4", data.len()).await;
    common::mount_chunk(
        &server,
        "sess-4",
        "bytes 0-262143/300000",
        ResponseTemplate::new(503),
    )
    .await;

    let err = upload::upload_resumable(
        &client(&server),
        "a.bin",
        &RemoteId::drive_root(),
        None,
        &data,
        CHUNK,
    )
    .await
    .unwrap_err();
    let err = RemoteError::from(err);
    assert!(matches!(err, RemoteError::Server { status: 503, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_session_without_location_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v2/files"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = upload::create_upload_session(
        &client(&server),
        "a.bin",
        &RemoteId::drive_root(),
        None,
        10,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DriveError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_store_switches_to_resumable_above_threshold() {
    let (server, store) = common::setup_drive_mock().await;
    let total = RESUMABLE_THRESHOLD + 1;
    common::mount_upload_session(&server, "sess-5", total).await;
    common::mount_chunk(
        &server,
        "sess-5",
        &format!("bytes 0-{}/{total}", total - 1),
        ResponseTemplate::new(200).set_body_json(common::file_json("big-5", "scan.tif", "dir-1")),
    )
    .await;
    Mock::given(method("POST"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let upload = FileUpload {
        title: "scan.tif".into(),
        parent_id: RemoteId::new("dir-1").unwrap(),
        description: None,
        data: vec![0u8; total],
    };
    let node = store.upload_file(&upload).await.expect("upload failed");
    assert_eq!(node.id.as_str(), "big-5");
}

#[tokio::test]
async fn test_store_keeps_multipart_at_threshold() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v2/files"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("mid-1", "m.bin", "root")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let upload = FileUpload {
        title: "m.bin".into(),
        parent_id: RemoteId::drive_root(),
        description: None,
        data: vec![0u8; RESUMABLE_THRESHOLD],
    };
    let node = store.upload_file(&upload).await.expect("upload failed");
    assert_eq!(node.id.as_str(), "mid-1");
}
