//! Integration tests for the HTTP collaborators
//!
//! Runs SessionHttpClient against a wiremock-backed session server.

use assert_matches::assert_matches;
use jukebox_session_client::{HttpError, SessionContext, SessionHttpClient, TrackInfo};
use jukebox_test_utils::MockSessionServer;
use rstest::rstest;

async fn setup() -> (MockSessionServer, SessionHttpClient) {
    let server = MockSessionServer::start().await;
    let client = SessionHttpClient::new(server.config())
        .unwrap()
        .with_max_retries(0);
    (server, client)
}

#[tokio::test]
async fn test_create_session_returns_authorize_url() {
    let (server, client) = setup().await;
    server
        .mock_create_session("https://accounts.example/authorize?client_id=abc")
        .await;

    let url = client.create_session().await.unwrap();
    assert_eq!(url.host_str(), Some("accounts.example"));
    assert_eq!(url.path(), "/authorize");
}

#[tokio::test]
async fn test_create_session_retries_transient_failures() {
    let server = MockSessionServer::start().await;
    server
        .mock_create_session_flaky(2, "https://accounts.example/authorize")
        .await;
    let client = SessionHttpClient::new(server.config())
        .unwrap()
        .with_max_retries(3);

    let url = client.create_session().await.unwrap();
    assert_eq!(url.as_str(), "https://accounts.example/authorize");
    assert_eq!(server.request_count("/create").await, 3);
}

#[tokio::test]
async fn test_create_session_rejects_non_url_body() {
    let (server, client) = setup().await;
    server.mock_create_session("not a url").await;

    assert_matches!(
        client.create_session().await,
        Err(HttpError::Parse { endpoint, .. }) if endpoint == "/create"
    );
}

#[rstest]
#[case("host", SessionContext::Host)]
#[case("peer", SessionContext::Peer)]
#[case("none", SessionContext::None)]
#[tokio::test]
async fn test_fetch_context(#[case] body: &str, #[case] expected: SessionContext) {
    let (server, client) = setup().await;
    server.mock_context(body).await;

    assert_eq!(client.fetch_context().await.unwrap(), expected);
}

#[tokio::test]
async fn test_fetch_context_unauthorized() {
    let (server, client) = setup().await;
    server.mock_context_unauthorized().await;

    assert_matches!(
        client.fetch_context().await,
        Err(HttpError::Status { status: 401, .. })
    );
}

#[tokio::test]
async fn test_fetch_context_unknown_role() {
    let (server, client) = setup().await;
    server.mock_context("admin").await;

    assert_matches!(client.fetch_context().await, Err(HttpError::Parse { .. }));
}

#[tokio::test]
async fn test_search_returns_tracks() {
    let (server, client) = setup().await;
    server
        .mock_search(
            "daft punk",
            vec![TrackInfo::new("t1", "One More Time", ["Daft Punk"])],
        )
        .await;

    let results = client.search("  daft punk ").await.unwrap();
    assert_eq!(results.tracks.len(), 1);
    assert_eq!(results.tracks[0].artist_line(), "Daft Punk");
}

#[tokio::test]
async fn test_empty_search_is_not_sent() {
    let (server, client) = setup().await;

    assert_matches!(client.search("  ").await, Err(HttpError::InvalidInput(_)));
    assert_eq!(server.request_count("/session/search").await, 0);
}

#[tokio::test]
async fn test_search_malformed_body() {
    let (server, client) = setup().await;
    server.mock_search_malformed().await;

    assert_matches!(client.search("x").await, Err(HttpError::Parse { .. }));
}

#[tokio::test]
async fn test_search_server_error() {
    let (server, client) = setup().await;
    server.mock_search_error(500).await;

    let err = client.search("x").await.unwrap_err();
    assert!(err.is_retryable());
    assert_matches!(err, HttpError::Status { status: 500, .. });
}

#[tokio::test]
async fn test_logout_accepts_redirect() {
    let (server, client) = setup().await;
    server.mock_logout().await;

    client.logout().await.unwrap();
    assert_eq!(server.request_count("/session/logout").await, 1);
}

#[tokio::test]
async fn test_logout_failure() {
    let (server, client) = setup().await;
    server.mock_logout_error(500).await;

    assert_matches!(
        client.logout().await,
        Err(HttpError::Status { status: 500, .. })
    );
}
