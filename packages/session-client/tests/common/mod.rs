//! Common test utilities for session client integration tests
//!
//! Spawns a [`SessionClient`] against a [`MockConnector`] so tests can play
//! the server end of the realtime link.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use jukebox_session_client::{CommandDispatcher, SessionClient, SessionContext, SessionExit};
use jukebox_shared_config::{ReconnectConfig, ServerConfig};
use jukebox_test_utils::{MockConnector, MockLinks, RecordingView};
use tokio::task::JoinHandle;

pub const SERVER_URL: &str = "http://jukebox.test";

/// Short window used to assert that nothing else happens
pub const QUIET: Duration = Duration::from_millis(150);

/// A session loop running in the background
pub struct RunningSession {
    pub dispatcher: CommandDispatcher,
    pub view: RecordingView,
    pub connector: MockConnector,
    pub links: MockLinks,
    handle: JoinHandle<(SessionExit, SessionClient<RecordingView>)>,
}

impl RunningSession {
    /// Wait for the session loop to finish
    pub async fn finished(self) -> (SessionExit, SessionClient<RecordingView>) {
        tokio::time::timeout(Duration::from_secs(2), self.handle)
            .await
            .expect("session did not finish in time")
            .expect("session task panicked")
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

pub fn test_reconnect() -> ReconnectConfig {
    ReconnectConfig::fixed(Duration::from_millis(25))
}

/// Start a session with a fast fixed reconnect policy
pub fn spawn_session(context: SessionContext) -> RunningSession {
    spawn_session_with(context, test_reconnect(), 0)
}

/// Start a session whose first `refused` dial attempts fail
pub fn spawn_session_with(
    context: SessionContext,
    reconnect: ReconnectConfig,
    refused: u32,
) -> RunningSession {
    let (connector, links) = MockConnector::new();
    connector.fail_next(refused);

    let view = RecordingView::new();
    let server = ServerConfig::with_url(SERVER_URL).expect("valid test url");
    let mut client = SessionClient::new(
        Arc::new(connector.clone()),
        &server,
        reconnect,
        context,
        view.clone(),
    );
    let dispatcher = client.dispatcher().clone();

    let handle = tokio::spawn(async move {
        let exit = client.run().await;
        (exit, client)
    });

    RunningSession {
        dispatcher,
        view,
        connector,
        links,
        handle,
    }
}
