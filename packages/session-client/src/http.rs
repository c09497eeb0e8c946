//! Plain HTTP collaborators of the session server
//!
//! Everything that is not part of the realtime protocol: starting a session,
//! resolving the participant role, the HTTP search fallback and logout. The
//! client keeps a cookie store so the server-side session survives between
//! calls.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jukebox_shared_config::ServerConfig;
use reqwest::cookie::Jar;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{HttpError, HttpResult};
use crate::models::{SearchResults, SessionContext};

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default number of retry attempts for transient failures
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds)
const RETRY_BASE_DELAY_MS: u64 = 100;

/// Maximum search query length
const MAX_QUERY_LENGTH: usize = 256;

const CREATE_PATH: &str = "/create";
const CONTEXT_PATH: &str = "/context";
const SEARCH_PATH: &str = "/session/search";

/// HTTP client for the session server's non-realtime endpoints
#[derive(Clone)]
pub struct SessionHttpClient {
    http_client: Client,
    server: ServerConfig,
    cookies: Arc<Jar>,
    max_retries: u32,
}

impl fmt::Debug for SessionHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHttpClient")
            .field("base_url", &self.server.base_url.as_str())
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl SessionHttpClient {
    /// Create a client for the given server
    ///
    /// Redirects are not followed: logout answers with a redirect that the
    /// front-end handles itself.
    pub fn new(server: ServerConfig) -> HttpResult<Self> {
        Self::with_cookie_jar(server, Arc::new(Jar::default()))
    }

    /// Create a client that stores session cookies in `cookies`
    ///
    /// Hand the same jar to [`WsConnector::with_cookies`](crate::WsConnector::with_cookies)
    /// so the realtime dial is authenticated as the same participant.
    pub fn with_cookie_jar(server: ServerConfig, cookies: Arc<Jar>) -> HttpResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(server.request_timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .redirect(Policy::none())
            .cookie_provider(Arc::clone(&cookies))
            .user_agent("Jukebox/1.0")
            .build()?;

        Ok(Self {
            http_client,
            server,
            cookies,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Override the number of retries for transient failures
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Cookie jar holding the server session
    pub fn cookies(&self) -> Arc<Jar> {
        Arc::clone(&self.cookies)
    }

    /// Link peers open to join the session `session_id`
    pub fn join_url(&self, session_id: &str) -> Url {
        self.server.join_url(session_id)
    }

    /// Validate search query input
    fn validate_query(query: &str) -> HttpResult<&str> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(HttpError::InvalidInput(
                "search query cannot be empty".to_string(),
            ));
        }
        if trimmed.len() > MAX_QUERY_LENGTH {
            return Err(HttpError::InvalidInput(format!(
                "search query too long (max {} characters)",
                MAX_QUERY_LENGTH
            )));
        }
        Ok(trimmed)
    }

    /// Execute an operation with retry logic for transient failures
    async fn with_retry<T, F, Fut>(&self, operation: F) -> HttpResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = HttpResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay_ms = RETRY_BASE_DELAY_MS * 2u64.pow(attempt);
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Session server request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Issue a GET and map transport failures
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> HttpResult<Response> {
        let url = self.server.http_url(path);
        self.http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout
                } else {
                    HttpError::Request(e)
                }
            })
    }

    /// GET a path and return the body of a 2xx response
    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> HttpResult<String> {
        let response = self.get(path, query).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(HttpError::Request)
    }

    /// Start a new session
    ///
    /// Returns the authorization URL the host must visit to grant playback
    /// access; the server redirects back to the session page afterwards.
    #[instrument(skip(self))]
    pub async fn create_session(&self) -> HttpResult<Url> {
        let body = self
            .with_retry(|| async { self.get_text(CREATE_PATH, &[]).await })
            .await?;

        let url = Url::parse(body.trim()).map_err(|e| HttpError::Parse {
            endpoint: CREATE_PATH.to_string(),
            reason: e.to_string(),
        })?;

        debug!(authorize_url = %url, "Session created");
        Ok(url)
    }

    /// Ask the server which role this client holds
    #[instrument(skip(self))]
    pub async fn fetch_context(&self) -> HttpResult<SessionContext> {
        let body = self
            .with_retry(|| async { self.get_text(CONTEXT_PATH, &[]).await })
            .await?;

        let context = body.parse::<SessionContext>().map_err(|reason| HttpError::Parse {
            endpoint: CONTEXT_PATH.to_string(),
            reason,
        })?;

        debug!(%context, "Resolved session context");
        Ok(context)
    }

    /// Search the catalog over HTTP
    ///
    /// # Errors
    /// - `HttpError::InvalidInput` - If the query is empty or too long
    /// - `HttpError::Status` - If the server rejects the request
    /// - `HttpError::Parse` - If the response is not a search result
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> HttpResult<SearchResults> {
        let query = Self::validate_query(query)?;

        debug!(query = %query, "Searching over HTTP");

        let body = self
            .with_retry(|| async { self.get_text(SEARCH_PATH, &[("input", query)]).await })
            .await?;

        let results: SearchResults =
            serde_json::from_str(&body).map_err(|e| HttpError::Parse {
                endpoint: SEARCH_PATH.to_string(),
                reason: e.to_string(),
            })?;

        debug!(result_count = results.tracks.len(), "Search finished");
        Ok(results)
    }

    /// End this client's server-side session
    ///
    /// The server answers with a redirect; any 2xx or 3xx status counts as
    /// success. Not retried.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> HttpResult<()> {
        let url = self.server.logout_url();
        let response = self.get(url.path(), &[]).await?;
        let status = response.status();

        if status.is_success() || status.is_redirection() {
            debug!(status = status.as_u16(), "Logged out");
            return Ok(());
        }

        Err(HttpError::Status {
            endpoint: url.path().to_string(),
            status: status.as_u16(),
        })
    }
}
