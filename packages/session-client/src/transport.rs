//! Realtime link abstraction
//!
//! A [`Connector`] opens one [`Link`] per call. The connection manager owns
//! the reconnect policy; a connector only knows how to dial once.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use reqwest::cookie::{CookieStore, Jar};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, COOKIE};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::error::TransportError;

/// Outbound half of a link, accepting text frames
pub type LinkSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Inbound half of a link, yielding text frames until the link closes
pub type LinkStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// One open bidirectional text link
pub struct Link {
    pub sink: LinkSink,
    pub stream: LinkStream,
}

impl Link {
    pub fn new(sink: LinkSink, stream: LinkStream) -> Self {
        Self { sink, stream }
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link").finish_non_exhaustive()
    }
}

/// Opens links to the session server
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, url: &Url) -> BoxFuture<'static, Result<Link, TransportError>>;
}

/// WebSocket connector backed by tokio-tungstenite
///
/// The session endpoint only accepts participants with a server session, so
/// the connector can present the cookies an HTTP client collected.
#[derive(Debug, Clone, Default)]
pub struct WsConnector {
    cookies: Option<Arc<Jar>>,
}

impl WsConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the cookies in `jar` with every handshake
    pub fn with_cookies(jar: Arc<Jar>) -> Self {
        Self { cookies: Some(jar) }
    }

    /// Build the upgrade request for `url`
    fn handshake_request(&self, url: &Url) -> Result<Request, TransportError> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let cookie = self
            .cookies
            .as_ref()
            .and_then(|jar| jar.cookies(&cookie_url(url)))
            .and_then(|value| HeaderValue::from_bytes(value.as_bytes()).ok());
        if let Some(cookie) = cookie {
            request.headers_mut().insert(COOKIE, cookie);
        }

        Ok(request)
    }
}

/// Cookies are scoped to the http(s) origin the socket upgrades from
fn cookie_url(url: &Url) -> Url {
    let mut http = url.clone();
    let scheme = if url.scheme() == "wss" { "https" } else { "http" };
    // ws/wss and http/https are all special schemes, so the swap cannot fail
    let _ = http.set_scheme(scheme);
    http
}

impl Connector for WsConnector {
    fn connect(&self, url: &Url) -> BoxFuture<'static, Result<Link, TransportError>> {
        let url = url.clone();
        let request = self.handshake_request(&url);
        Box::pin(async move {
            let (socket, _response) = tokio_tungstenite::connect_async(request?)
                .await
                .map_err(|e| TransportError::Connect {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            let (ws_sender, ws_receiver) = socket.split();

            let sink = ws_sender
                .sink_map_err(TransportError::from)
                .with(|text: String| future::ready(Ok::<_, TransportError>(Message::Text(text))));

            let stream = ws_receiver.filter_map(|result| {
                future::ready(match result {
                    Ok(Message::Text(text)) => Some(Ok(text)),
                    Ok(Message::Binary(_)) => {
                        // Binary messages are not part of the session protocol
                        tracing::debug!("Ignoring binary frame");
                        None
                    }
                    // Ping/pong are answered by tungstenite; the stream ends after Close
                    Ok(_) => None,
                    Err(e) => Some(Err(TransportError::from(e))),
                })
            });

            Ok(Link::new(Box::pin(sink), Box::pin(stream)))
        })
    }
}
