//! Session link lifecycle
//!
//! [`ConnectionManager`] owns the single logical connection of a client:
//! it dials through a [`Connector`], reconnects with backoff when the link
//! drops, and reports everything that happens as [`ConnectionEvent`]s on one
//! channel consumed by the session loop.
//!
//! Each socket instance is tagged with a generation. `connect()` and
//! `disconnect()` advance the generation, and so does every reconnect, so a
//! consumer can drop events that belong to a link that has since been
//! replaced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use jukebox_shared_config::ReconnectConfig;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use crate::transport::{Connector, Link};

/// Lifecycle state of the logical connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Reconnecting => write!(f, "reconnecting"),
        }
    }
}

/// Something that happened on a specific link instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    /// Generation of the link the event belongs to
    pub generation: u64,
    pub kind: ConnectionEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEventKind {
    /// The link is open and ready to carry commands
    Opened,
    /// A text frame arrived
    Frame(String),
    /// The link dropped; a reconnect is scheduled
    Lost,
    /// The manager gave up reconnecting
    Closed,
}

/// Where outbound frames go
///
/// Sending never fails loudly: a frame offered while no link is open is
/// dropped and `false` is returned.
pub trait CommandSink: Send + Sync {
    fn send(&self, frame: String) -> bool;
}

/// State shared between the manager handle and its supervisor task
struct Shared {
    generation: AtomicU64,
    status: Mutex<ConnectionStatus>,
    outbound: Mutex<Option<(u64, mpsc::UnboundedSender<String>)>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Move from `generation` to the next one, unless someone else already did
    fn advance_from(&self, generation: u64) -> Option<u64> {
        self.generation
            .compare_exchange(generation, generation + 1, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| generation + 1)
    }

    fn set_status(&self, generation: u64, status: ConnectionStatus) {
        let mut guard = self.status.lock();
        if self.is_current(generation) {
            *guard = status;
        }
    }

    fn install_outbound(&self, generation: u64, sender: mpsc::UnboundedSender<String>) -> bool {
        let mut guard = self.outbound.lock();
        if !self.is_current(generation) {
            return false;
        }
        *guard = Some((generation, sender));
        true
    }

    /// Forget the supervisor handle, unless a newer instance already owns the slot
    fn release_task(&self, generation: u64) {
        let mut guard = self.task.lock();
        if self.is_current(generation) {
            guard.take();
        }
    }

    fn clear_outbound(&self, generation: u64) {
        let mut guard = self.outbound.lock();
        if matches!(guard.as_ref(), Some((current, _)) if *current == generation) {
            *guard = None;
        }
    }
}

/// Owned handle to the client's single session connection
///
/// Cheap to clone; all clones drive the same connection.
#[derive(Clone)]
pub struct ConnectionManager {
    shared: Arc<Shared>,
    connector: Arc<dyn Connector>,
    url: Url,
    reconnect: ReconnectConfig,
    events: mpsc::UnboundedSender<ConnectionEvent>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("url", &self.url.as_str())
            .field("generation", &self.generation())
            .field("status", &self.status())
            .finish()
    }
}

impl ConnectionManager {
    /// Create a disconnected manager and the receiver for its events
    pub fn new(
        connector: Arc<dyn Connector>,
        url: Url,
        reconnect: ReconnectConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let manager = Self {
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                status: Mutex::new(ConnectionStatus::Disconnected),
                outbound: Mutex::new(None),
                task: Mutex::new(None),
            }),
            connector,
            url,
            reconnect,
            events,
        };
        (manager, events_rx)
    }

    /// Generation of the newest link instance
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Whether an event tagged `generation` belongs to the live link
    pub fn is_current(&self, generation: u64) -> bool {
        self.shared.is_current(generation)
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.shared.status.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Establish the logical connection
    ///
    /// Any previous instance is torn down first, so at most one link is
    /// ever live. Must be called from within a tokio runtime.
    pub fn connect(&self) {
        self.disconnect();

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.set_status(generation, ConnectionStatus::Connecting);

        tracing::info!(url = %self.url, generation, "Connecting to session server");

        let task = tokio::spawn(self.clone().supervise(generation));
        *self.shared.task.lock() = Some(task);
    }

    /// Close the logical connection
    ///
    /// Invalidates every event still in flight from the old link.
    pub fn disconnect(&self) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.outbound.lock().take();

        if let Some(task) = self.shared.task.lock().take() {
            tracing::info!(generation, "Disconnecting from session server");
            task.abort();
        }

        *self.shared.status.lock() = ConnectionStatus::Disconnected;
    }

    /// Dial, pump and redial until told to stop or out of attempts
    async fn supervise(self, first_generation: u64) {
        let mut generation = first_generation;
        let mut failures: u32 = 0;

        loop {
            match self.connector.connect(&self.url).await {
                Ok(link) => {
                    failures = 0;
                    if !self.pump(generation, link).await {
                        return;
                    }
                    tracing::warn!(generation, "Session link lost");
                    self.emit(generation, ConnectionEventKind::Lost);
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(
                        generation,
                        attempt = failures,
                        error = %e,
                        "Failed to open session link"
                    );
                }
            }

            if !self.reconnect.allows_attempt(failures) {
                tracing::warn!(
                    generation,
                    failures,
                    "Giving up on session server after repeated failures"
                );
                self.shared.set_status(generation, ConnectionStatus::Disconnected);
                self.shared.release_task(generation);
                self.emit(generation, ConnectionEventKind::Closed);
                return;
            }

            self.shared.set_status(generation, ConnectionStatus::Reconnecting);
            let delay = self.reconnect.delay_for_attempt(failures.saturating_sub(1));
            tracing::debug!(generation, delay_ms = delay.as_millis() as u64, "Reconnecting");
            tokio::time::sleep(delay).await;

            generation = match self.shared.advance_from(generation) {
                Some(next) => next,
                // A newer connect()/disconnect() owns the connection now
                None => return,
            };
        }
    }

    /// Carry frames both ways until the link ends
    ///
    /// Returns `false` when the link was superseded before it could be used.
    async fn pump(&self, generation: u64, link: Link) -> bool {
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        if !self.shared.install_outbound(generation, outbound_tx) {
            tracing::debug!(generation, "Dropping link opened for a superseded generation");
            return false;
        }

        self.shared.set_status(generation, ConnectionStatus::Connected);
        tracing::info!(generation, "Session link open");
        self.emit(generation, ConnectionEventKind::Opened);

        let Link {
            mut sink,
            mut stream,
        } = link;

        loop {
            tokio::select! {
                Some(frame) = outbound_rx.recv() => {
                    if let Err(e) = sink.send(frame).await {
                        tracing::debug!(generation, error = %e, "Session link send failed");
                        break;
                    }
                }
                incoming = stream.next() => match incoming {
                    Some(Ok(frame)) => self.emit(generation, ConnectionEventKind::Frame(frame)),
                    Some(Err(e)) => {
                        tracing::debug!(generation, error = %e, "Session link error");
                        break;
                    }
                    None => break,
                },
            }
        }

        self.shared.clear_outbound(generation);
        true
    }

    fn emit(&self, generation: u64, kind: ConnectionEventKind) {
        // The receiver only goes away when the session itself is gone
        let _ = self.events.send(ConnectionEvent { generation, kind });
    }
}

impl CommandSink for ConnectionManager {
    fn send(&self, frame: String) -> bool {
        let guard = self.shared.outbound.lock();
        match guard.as_ref() {
            Some((generation, sender)) => {
                let sent = sender.send(frame).is_ok();
                if !sent {
                    tracing::debug!(generation = *generation, "Dropping frame: link closing");
                }
                sent
            }
            None => {
                tracing::debug!("Dropping frame: not connected");
                false
            }
        }
    }
}
