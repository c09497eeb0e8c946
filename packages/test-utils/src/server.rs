//! Mock session server HTTP endpoints
//!
//! Provides a [`MockSessionServer`] that simulates the plain HTTP side of
//! the session server (session creation, context, search and logout).

use jukebox_session_client::{SearchResults, TrackInfo};
use jukebox_shared_config::ServerConfig;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock session server for testing the HTTP collaborators
///
/// This struct wraps a [`wiremock::MockServer`] and provides convenience
/// methods for setting up common session server responses.
pub struct MockSessionServer {
    server: MockServer,
}

impl MockSessionServer {
    /// Start a new mock session server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Server configuration pointing at this mock
    pub fn config(&self) -> ServerConfig {
        ServerConfig::with_url(&self.server.uri()).expect("mock server uri is a valid http url")
    }

    /// Mount a mock for `/create` answering with an authorization URL
    pub async fn mock_create_session(&self, authorize_url: &str) {
        Mock::given(method("GET"))
            .and(path("/create"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain")
                    .set_body_string(authorize_url),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount a `/create` mock that fails `failures` times before succeeding
    pub async fn mock_create_session_flaky(&self, failures: u64, authorize_url: &str) {
        Mock::given(method("GET"))
            .and(path("/create"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(failures)
            .mount(&self.server)
            .await;

        self.mock_create_session(authorize_url).await;
    }

    /// Mount a mock for `/context` answering with a plaintext role
    pub async fn mock_context(&self, context: &str) {
        Mock::given(method("GET"))
            .and(path("/context"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain")
                    .set_body_string(context),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount a `/context` mock that also opens a server session via `cookie`
    ///
    /// `cookie` is a `Set-Cookie` value such as `id=abc; Path=/; HttpOnly`.
    pub async fn mock_context_with_session(&self, context: &str, cookie: &str) {
        Mock::given(method("GET"))
            .and(path("/context"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain")
                    .insert_header("set-cookie", cookie)
                    .set_body_string(context),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for `/context` rejecting an unknown client
    pub async fn mock_context_unauthorized(&self) {
        Mock::given(method("GET"))
            .and(path("/context"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for a search returning `tracks`
    pub async fn mock_search(&self, query: &str, tracks: Vec<TrackInfo>) {
        Mock::given(method("GET"))
            .and(path("/session/search"))
            .and(query_param("input", query))
            .respond_with(ResponseTemplate::new(200).set_body_json(SearchResults { tracks }))
            .mount(&self.server)
            .await;
    }

    /// Mount a search mock answering with a body that is not a search result
    pub async fn mock_search_malformed(&self) {
        Mock::given(method("GET"))
            .and(path("/session/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": "nope"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a search mock answering with `status`
    pub async fn mock_search_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/session/search"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mount a logout mock redirecting to the landing page
    pub async fn mock_logout(&self) {
        Mock::given(method("GET"))
            .and(path("/session/logout"))
            .respond_with(ResponseTemplate::new(303).insert_header("location", "/"))
            .mount(&self.server)
            .await;
    }

    /// Mount a logout mock answering with `status`
    pub async fn mock_logout_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/session/logout"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received for `request_path`
    pub async fn request_count(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == request_path)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_context() {
        let server = MockSessionServer::start().await;
        server.mock_context("host").await;

        let body = reqwest::get(format!("{}/context", server.url()))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "host");
        assert_eq!(server.request_count("/context").await, 1);
    }

    #[tokio::test]
    async fn test_mock_search_matches_input() {
        let server = MockSessionServer::start().await;
        server
            .mock_search("daft", vec![TrackInfo::new("t1", "One More Time", ["Daft Punk"])])
            .await;

        let response = reqwest::get(format!("{}/session/search?input=daft", server.url()))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let results: serde_json::Value = response.json().await.unwrap();
        assert_eq!(results["tracks"][0]["id"], "t1");
    }

    #[tokio::test]
    async fn test_config_points_at_mock() {
        let server = MockSessionServer::start().await;
        let config = server.config();
        assert!(config.logout_url().as_str().starts_with(&server.url()));
    }
}
