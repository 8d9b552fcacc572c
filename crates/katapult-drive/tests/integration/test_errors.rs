//! Integration tests for error classification at the port boundary

use katapult_core::domain::RemoteId;
use katapult_core::ports::{IRemoteStore, NewNode, RemoteError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_403_user_rate_limit_is_transient() {
    let (server, store) = common::setup_drive_mock().await;
    common::mount_error(&server, "GET", "/drive/v2/files", 403, "userRateLimitExceeded").await;

    let err = store
        .list_children(&RemoteId::drive_root(), None, 100)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RemoteError::RateLimited("userRateLimitExceeded".to_string())
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_403_permission_is_fatal() {
    let (server, store) = common::setup_drive_mock().await;
    common::mount_error(&server, "POST", "/drive/v2/files", 403, "insufficientPermissions").await;

    let err = store
        .create_node(&NewNode::folder("x", RemoteId::drive_root()))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { status: 403, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_429_is_transient() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/drive/v2/files"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = store
        .list_children(&RemoteId::drive_root(), None, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::RateLimited(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_500_is_transient() {
    let (server, store) = common::setup_drive_mock().await;
    common::mount_error(&server, "PATCH", "/drive/v2/files/f1", 500, "backendError").await;

    let err = store
        .patch_description(&RemoteId::new("f1").unwrap(), "Date: 1901")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Server { status: 500, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_404_is_fatal() {
    let (server, store) = common::setup_drive_mock().await;
    common::mount_error(&server, "GET", "/drive/v2/files", 404, "notFound").await;

    let err = store
        .list_children(&RemoteId::new("gone").unwrap(), None, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { status: 404, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_fatal() {
    let (server, store) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/drive/v2/files"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = store
        .list_children(&RemoteId::drive_root(), None, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    let server = wiremock::MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let store = katapult_drive::provider::DriveRemoteStore::new(
        katapult_drive::client::DriveClient::with_base_url(common::TOKEN, uri),
    );
    let err = store
        .list_children(&RemoteId::drive_root(), None, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Network(_)));
    assert!(err.is_transient());
}
