//! Session loop
//!
//! [`SessionClient`] wires the connection, dispatcher, router, store and
//! view together and runs the single consumer loop that applies connection
//! events and local actions in order.

use std::sync::Arc;

use jukebox_shared_config::{ReconnectConfig, ServerConfig};
use tokio::sync::mpsc;

use crate::connection::{ConnectionEvent, ConnectionEventKind, ConnectionManager, ConnectionStatus};
use crate::dispatcher::{CommandDispatcher, LocalAction};
use crate::models::SessionContext;
use crate::protocol;
use crate::router::{EventRouter, RouteOutcome, SessionExit};
use crate::store::SessionStateStore;
use crate::transport::Connector;
use crate::view::SessionView;

/// One participant's live session
pub struct SessionClient<V: SessionView> {
    connection: ConnectionManager,
    events: mpsc::UnboundedReceiver<ConnectionEvent>,
    actions: mpsc::UnboundedReceiver<LocalAction>,
    dispatcher: CommandDispatcher,
    router: EventRouter,
    store: SessionStateStore,
    view: V,
    decode_failures: u64,
    stale_events: u64,
}

impl<V: SessionView> std::fmt::Debug for SessionClient<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("connection", &self.connection)
            .field("context", &self.dispatcher.context())
            .field("decode_failures", &self.decode_failures)
            .field("stale_events", &self.stale_events)
            .finish_non_exhaustive()
    }
}

impl<V: SessionView> SessionClient<V> {
    pub fn new(
        connector: Arc<dyn Connector>,
        server: &ServerConfig,
        reconnect: ReconnectConfig,
        context: SessionContext,
        view: V,
    ) -> Self {
        let (connection, events) = ConnectionManager::new(connector, server.ws_url(), reconnect);
        let (actions_tx, actions) = mpsc::unbounded_channel();
        let dispatcher = CommandDispatcher::new(Arc::new(connection.clone()), context, actions_tx);
        let router = EventRouter::new(dispatcher.clone(), server.logout_url());

        Self {
            connection,
            events,
            actions,
            dispatcher,
            router,
            store: SessionStateStore::new(),
            view,
            decode_failures: 0,
            stale_events: 0,
        }
    }

    /// Handle for issuing commands; clone it into input tasks
    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn context(&self) -> SessionContext {
        self.dispatcher.context()
    }

    pub fn store(&self) -> &SessionStateStore {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Frames dropped because they could not be decoded
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    /// Events dropped because their link had been replaced
    pub fn stale_events(&self) -> u64 {
        self.stale_events
    }

    /// Connect and process events until the session ends
    pub async fn run(&mut self) -> SessionExit {
        tracing::info!(context = %self.context(), "Joining session");

        self.connection.connect();
        self.view.connection_changed(ConnectionStatus::Connecting);

        let exit = loop {
            tokio::select! {
                Some(event) = self.events.recv() => {
                    if let Some(exit) = self.handle_connection_event(event) {
                        break exit;
                    }
                }
                Some(action) = self.actions.recv() => {
                    if let Some(exit) = self.handle_action(action) {
                        break exit;
                    }
                }
                else => break SessionExit::ConnectionClosed,
            }
        };

        self.connection.disconnect();
        self.view.connection_changed(ConnectionStatus::Disconnected);

        tracing::info!(
            reason = %exit,
            decode_failures = self.decode_failures,
            stale_events = self.stale_events,
            "Session finished"
        );
        exit
    }

    pub(crate) fn handle_connection_event(&mut self, event: ConnectionEvent) -> Option<SessionExit> {
        if !self.connection.is_current(event.generation) {
            self.stale_events += 1;
            tracing::debug!(
                generation = event.generation,
                current = self.connection.generation(),
                "Dropping event from replaced link"
            );
            return None;
        }

        match event.kind {
            ConnectionEventKind::Opened => {
                self.view.connection_changed(ConnectionStatus::Connected);
                self.router.on_open();
            }
            ConnectionEventKind::Frame(frame) => match protocol::decode(&frame) {
                Ok(server_event) => {
                    let outcome = self.router.route(server_event, &mut self.store, &mut self.view);
                    if let RouteOutcome::Exit(exit) = outcome {
                        return Some(exit);
                    }
                }
                Err(e) => {
                    self.decode_failures += 1;
                    tracing::warn!(error = %e, "Dropping undecodable frame");
                }
            },
            ConnectionEventKind::Lost => {
                self.view.connection_changed(ConnectionStatus::Reconnecting);
            }
            ConnectionEventKind::Closed => {
                self.view.connection_changed(ConnectionStatus::Disconnected);
                return Some(SessionExit::ConnectionClosed);
            }
        }

        None
    }

    fn handle_action(&mut self, action: LocalAction) -> Option<SessionExit> {
        match action {
            LocalAction::CloseSearchPanel => {
                self.view.close_search_panel();
                None
            }
            LocalAction::Leave => {
                self.view.exit_session(self.router.logout_url());
                Some(SessionExit::Left)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::Link;
    use crate::view::NullView;
    use futures_util::future::{self, BoxFuture};
    use url::Url;

    /// Connector that never finishes dialing
    struct PendingConnector;

    impl Connector for PendingConnector {
        fn connect(&self, _url: &Url) -> BoxFuture<'static, Result<Link, TransportError>> {
            Box::pin(future::pending())
        }
    }

    fn client(context: SessionContext) -> SessionClient<NullView> {
        let server = ServerConfig::with_url("http://localhost:8080").unwrap();
        SessionClient::new(
            Arc::new(PendingConnector),
            &server,
            ReconnectConfig::default(),
            context,
            NullView,
        )
    }

    fn frame(generation: u64, text: &str) -> ConnectionEvent {
        ConnectionEvent {
            generation,
            kind: ConnectionEventKind::Frame(text.to_string()),
        }
    }

    const STATE: &str = r#"{"type":"StateUpdate","payload":{"track":null,"queue":[{"id":"t1","name":"One","artists":[]}]}}"#;

    #[test]
    fn test_current_generation_frames_are_applied() {
        let mut client = client(SessionContext::Peer);
        let current = client.connection().generation();

        assert_eq!(client.handle_connection_event(frame(current, STATE)), None);
        assert!(client.store().is_synced());
        assert_eq!(client.store().queue()[0].id, "t1");
    }

    #[tokio::test]
    async fn test_frames_from_replaced_link_are_dropped() {
        let mut client = client(SessionContext::Peer);
        client.connection().connect();
        let replaced = client.connection().generation();

        client.connection().connect();
        assert!(!client.connection().is_current(replaced));

        let opened = ConnectionEvent {
            generation: replaced,
            kind: ConnectionEventKind::Opened,
        };
        assert_eq!(client.handle_connection_event(opened), None);
        assert_eq!(client.handle_connection_event(frame(replaced, STATE)), None);
        assert!(!client.store().is_synced());
        assert_eq!(client.stale_events(), 2);

        let current = client.connection().generation();
        client.handle_connection_event(frame(current, STATE));
        assert!(client.store().is_synced());
        assert_eq!(client.stale_events(), 2);
    }

    #[tokio::test]
    async fn test_frames_from_before_disconnect_are_dropped() {
        let mut client = client(SessionContext::Peer);
        client.connection().connect();
        let before = client.connection().generation();
        client.connection().disconnect();

        assert_eq!(client.handle_connection_event(frame(before, STATE)), None);
        assert!(!client.store().is_synced());
        assert_eq!(client.stale_events(), 1);
    }

    #[test]
    fn test_undecodable_frames_are_counted_and_skipped() {
        let mut client = client(SessionContext::Host);
        let current = client.connection().generation();

        client.handle_connection_event(frame(current, "{oops"));
        client.handle_connection_event(frame(current, r#"{"type":"Confetti"}"#));
        client.handle_connection_event(frame(current, STATE));

        assert_eq!(client.decode_failures(), 2);
        assert!(client.store().is_synced());
    }

    #[test]
    fn test_shutdown_and_closed_end_the_session() {
        let mut client = client(SessionContext::Peer);
        let current = client.connection().generation();

        assert_eq!(
            client.handle_connection_event(frame(current, r#"{"type":"Shutdown"}"#)),
            Some(SessionExit::Shutdown)
        );
        assert_eq!(
            client.handle_connection_event(ConnectionEvent {
                generation: current,
                kind: ConnectionEventKind::Closed,
            }),
            Some(SessionExit::ConnectionClosed)
        );
    }

    #[tokio::test]
    async fn test_leave_ends_run() {
        let mut client = client(SessionContext::Peer);
        client.dispatcher().leave();

        let exit = tokio::time::timeout(std::time::Duration::from_secs(2), client.run())
            .await
            .unwrap();
        assert_eq!(exit, SessionExit::Left);
        assert_eq!(client.connection().status(), ConnectionStatus::Disconnected);
    }
}
