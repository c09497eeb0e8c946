//! Mock realtime transport
//!
//! Provides a [`MockConnector`] that hands every dialed link to the test as
//! a [`MockLink`], so the test can play the session server: push frames,
//! read the commands the client sent, and drop the link.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{self, BoxFuture};
use jukebox_session_client::{ClientCommand, Connector, Link, ServerEvent, TransportError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use url::Url;

/// How long helpers wait for the client before failing the test
const WAIT: Duration = Duration::from_secs(2);

/// Connector whose links the test holds the far end of
///
/// Cheap to clone; all clones share the same counters.
#[derive(Clone)]
pub struct MockConnector {
    links: mpsc::UnboundedSender<MockLink>,
    failures_left: Arc<AtomicU32>,
    attempts: Arc<AtomicUsize>,
}

/// Links opened by the client, in dial order
pub struct MockLinks {
    rx: mpsc::UnboundedReceiver<MockLink>,
}

/// Server end of one open link
pub struct MockLink {
    from_client: mpsc::UnboundedReceiver<String>,
    to_client: Option<mpsc::UnboundedSender<Result<String, TransportError>>>,
}

impl MockConnector {
    /// Create a connector and the queue of links it opens
    pub fn new() -> (Self, MockLinks) {
        let (links, rx) = mpsc::unbounded_channel();
        let connector = Self {
            links,
            failures_left: Arc::new(AtomicU32::new(0)),
            attempts: Arc::new(AtomicUsize::new(0)),
        };
        (connector, MockLinks { rx })
    }

    /// Refuse the next `count` dial attempts
    pub fn fail_next(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Number of dial attempts so far, failed ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    fn connect(&self, url: &Url) -> BoxFuture<'static, Result<Link, TransportError>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let refuse = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refuse {
            return Box::pin(future::ready(Err(TransportError::Connect {
                url: url.to_string(),
                reason: "refused by mock".to_string(),
            })));
        }

        let (client_tx, from_client) = mpsc::unbounded_channel::<String>();
        let (to_client, client_rx) = mpsc::unbounded_channel();

        // The test may have stopped listening for links; the link then just idles
        let _ = self.links.send(MockLink {
            from_client,
            to_client: Some(to_client),
        });

        let sink = futures_util::sink::unfold(client_tx, |tx, frame: String| async move {
            tx.send(frame).map_err(|_| TransportError::Closed)?;
            Ok::<_, TransportError>(tx)
        });
        let stream = UnboundedReceiverStream::new(client_rx);

        Box::pin(future::ready(Ok(Link::new(Box::pin(sink), Box::pin(stream)))))
    }
}

impl MockLinks {
    /// Wait for the client to open its next link
    pub async fn accept(&mut self) -> MockLink {
        tokio::time::timeout(WAIT, self.rx.recv())
            .await
            .expect("client did not open a link in time")
            .expect("connector dropped")
    }

    /// Assert no further link is opened within `window`
    pub async fn expect_none(&mut self, window: Duration) {
        if let Ok(Some(_)) = tokio::time::timeout(window, self.rx.recv()).await {
            panic!("client opened an unexpected link");
        }
    }
}

impl MockLink {
    /// Send a raw text frame to the client
    pub fn push(&self, frame: impl Into<String>) {
        if let Some(tx) = &self.to_client {
            let _ = tx.send(Ok(frame.into()));
        }
    }

    /// Send a server event to the client
    pub fn push_event(&self, event: &ServerEvent) {
        self.push(serde_json::to_string(event).expect("server event serializes"));
    }

    /// Fail the link with a transport error
    pub fn fail(&self) {
        if let Some(tx) = &self.to_client {
            let _ = tx.send(Err(TransportError::Closed));
        }
    }

    /// End the inbound stream, as if the server closed the socket
    pub fn close(&mut self) {
        self.to_client = None;
    }

    /// Wait for the next command the client sends
    pub async fn next_command(&mut self) -> ClientCommand {
        let frame = tokio::time::timeout(WAIT, self.from_client.recv())
            .await
            .expect("client sent no command in time")
            .expect("link closed by client");
        serde_json::from_str(&frame).expect("client sent an invalid command frame")
    }

    /// Wait for exactly `count` commands
    pub async fn next_commands(&mut self, count: usize) -> Vec<ClientCommand> {
        let mut commands = Vec::with_capacity(count);
        for _ in 0..count {
            commands.push(self.next_command().await);
        }
        commands
    }

    /// Collect every command that arrives within `window`
    pub async fn commands_within(&mut self, window: Duration) -> Vec<ClientCommand> {
        let mut commands = Vec::new();
        let deadline = tokio::time::Instant::now() + window;
        while let Ok(Some(frame)) =
            tokio::time::timeout_at(deadline, self.from_client.recv()).await
        {
            commands.push(
                serde_json::from_str(&frame).expect("client sent an invalid command frame"),
            );
        }
        commands
    }
}
