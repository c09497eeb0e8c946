//! Server event handling
//!
//! [`EventRouter`] applies one decoded [`ServerEvent`] to the store and the
//! view. It is the only writer of [`SessionStateStore`].

use url::Url;

use crate::dispatcher::CommandDispatcher;
use crate::models::{SessionContext, VotedTrackSet};
use crate::protocol::ServerEvent;
use crate::store::SessionStateStore;
use crate::view::SessionView;

/// Result code the server sends for a successful transfer
pub const TRANSFER_OK: &str = "OK";

/// Why a session loop finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The server ended the session
    Shutdown,
    /// The user left
    Left,
    /// The connection could not be re-established
    ConnectionClosed,
}

impl std::fmt::Display for SessionExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionExit::Shutdown => write!(f, "session ended by server"),
            SessionExit::Left => write!(f, "left session"),
            SessionExit::ConnectionClosed => write!(f, "connection closed"),
        }
    }
}

/// What the session loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Continue,
    Exit(SessionExit),
}

#[derive(Debug, Clone)]
pub struct EventRouter {
    dispatcher: CommandDispatcher,
    context: SessionContext,
    logout_url: Url,
}

impl EventRouter {
    pub fn new(dispatcher: CommandDispatcher, logout_url: Url) -> Self {
        let context = dispatcher.context();
        Self {
            dispatcher,
            context,
            logout_url,
        }
    }

    pub fn logout_url(&self) -> &Url {
        &self.logout_url
    }

    /// Initial requests for a freshly opened link
    ///
    /// Runs once per link instance, so every reconnect resynchronizes from
    /// scratch.
    pub fn on_open(&self) {
        self.dispatcher.request_state();
        if self.context.is_host() {
            // Host context was checked above, so this cannot be rejected
            let _ = self.dispatcher.request_devices();
        }
    }

    /// Apply one event to the store and the view
    pub fn route<V: SessionView + ?Sized>(
        &self,
        event: ServerEvent,
        store: &mut SessionStateStore,
        view: &mut V,
    ) -> RouteOutcome {
        tracing::debug!(event = event.name(), "Routing server event");

        match event {
            ServerEvent::Devices(devices) => {
                store.replace_devices(devices);
                view.show_device_picker(store.devices());
            }
            ServerEvent::SearchResult(results) => {
                store.replace_search_results(results);
                view.render_search_results(store.search_results());
            }
            ServerEvent::StateUpdate(state) => {
                store.replace_playback(state);
                if let Some(playback) = store.playback() {
                    view.render_state(playback, store.voted());
                }
                // Vote state is fetched after every snapshot, never before
                self.dispatcher.request_voted_tracks();
            }
            ServerEvent::VotedTracks(ids) => {
                store.replace_voted(ids.into_iter().collect::<VotedTrackSet>());
                view.update_vote_controls(&store.vote_controls());
            }
            ServerEvent::Transfer(code) => {
                if code == TRANSFER_OK {
                    view.close_device_panel();
                } else {
                    tracing::warn!(result = %code, "Playback transfer failed");
                }
            }
            ServerEvent::Shutdown => {
                tracing::info!(context = %self.context, "Session shut down by server");
                view.exit_session(&self.logout_url);
                return RouteOutcome::Exit(SessionExit::Shutdown);
            }
        }

        RouteOutcome::Continue
    }
}
