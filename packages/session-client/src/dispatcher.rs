//! User intents to protocol commands
//!
//! Every dispatcher method validates its preconditions and then hands one
//! encoded command to the [`CommandSink`]. Nothing here waits for an answer:
//! effects arrive later as independent server events.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::connection::CommandSink;
use crate::error::{CommandError, CommandResult};
use crate::models::SessionContext;
use crate::protocol::{self, ClientCommand};

/// Local follow-ups of user intents, handled on the session loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalAction {
    /// A track was queued from the search panel
    CloseSearchPanel,
    /// The user chose to leave the session
    Leave,
}

/// Validates and sends commands on behalf of the UI
///
/// Cheap to clone and safe to use from any task.
#[derive(Clone)]
pub struct CommandDispatcher {
    sink: Arc<dyn CommandSink>,
    context: SessionContext,
    actions: mpsc::UnboundedSender<LocalAction>,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl CommandDispatcher {
    pub fn new(
        sink: Arc<dyn CommandSink>,
        context: SessionContext,
        actions: mpsc::UnboundedSender<LocalAction>,
    ) -> Self {
        Self {
            sink,
            context,
            actions,
        }
    }

    pub fn context(&self) -> SessionContext {
        self.context
    }

    /// Search the catalog; blank queries are not sent
    pub fn search(&self, query: &str) -> CommandResult<()> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CommandError::EmptyQuery);
        }
        self.dispatch(ClientCommand::Search {
            query: query.to_string(),
        });
        Ok(())
    }

    /// Add a track to the queue and close the search panel
    pub fn queue(&self, track_id: &str) -> CommandResult<()> {
        let uri = non_empty(track_id, CommandError::EmptyTrackId)?;
        self.dispatch(ClientCommand::Queue { uri });
        self.notify(LocalAction::CloseSearchPanel);
        Ok(())
    }

    /// Vote for a queued track
    ///
    /// The vote control stays enabled until the server's `VotedTracks`
    /// answer confirms the vote.
    pub fn vote(&self, track_id: &str) -> CommandResult<()> {
        let uri = non_empty(track_id, CommandError::EmptyTrackId)?;
        self.dispatch(ClientCommand::Vote { uri });
        Ok(())
    }

    /// Ask for a full playback state snapshot
    pub fn request_state(&self) {
        self.dispatch(ClientCommand::State);
    }

    /// Ask which queued tracks this client has voted for
    pub fn request_voted_tracks(&self) {
        self.dispatch(ClientCommand::VotedTracks);
    }

    /// Ask for the host's playback devices
    pub fn request_devices(&self) -> CommandResult<()> {
        self.dispatch_checked(ClientCommand::Devices)
    }

    /// Move playback to another device
    pub fn transfer(&self, device_id: &str) -> CommandResult<()> {
        let device_id = non_empty(device_id, CommandError::EmptyDeviceId)?;
        self.dispatch_checked(ClientCommand::Transfer { device_id })
    }

    /// End the session for every participant
    pub fn end_session(&self) -> CommandResult<()> {
        self.dispatch_checked(ClientCommand::Kill)
    }

    /// Leave the session without ending it for others
    pub fn leave(&self) {
        self.notify(LocalAction::Leave);
    }

    /// Send `command` if this participant is allowed to
    fn dispatch_checked(&self, command: ClientCommand) -> CommandResult<()> {
        if command.requires_host() && !self.context.is_host() {
            tracing::warn!(
                command = command.name(),
                context = %self.context,
                "Rejected host-only command"
            );
            return Err(CommandError::HostOnly {
                command: command.name(),
                context: self.context,
            });
        }
        self.dispatch(command);
        Ok(())
    }

    fn dispatch(&self, command: ClientCommand) {
        match protocol::encode(&command) {
            Ok(frame) => {
                if self.sink.send(frame) {
                    tracing::debug!(command = command.name(), "Command sent");
                }
            }
            Err(e) => {
                tracing::error!(command = command.name(), error = %e, "Failed to encode command");
            }
        }
    }

    fn notify(&self, action: LocalAction) {
        // No receiver means the session loop has already finished
        let _ = self.actions.send(action);
    }
}

fn non_empty(value: &str, error: CommandError) -> CommandResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(error);
    }
    Ok(value.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::protocol::ClientCommand;
    use assert_matches::assert_matches;
    use parking_lot::Mutex;

    /// Sink that records every frame it is offered
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        frames: Mutex<Vec<String>>,
        pub(crate) offline: bool,
    }

    impl RecordingSink {
        pub(crate) fn commands(&self) -> Vec<ClientCommand> {
            self.frames
                .lock()
                .iter()
                .map(|frame| serde_json::from_str(frame).unwrap())
                .collect()
        }
    }

    impl CommandSink for RecordingSink {
        fn send(&self, frame: String) -> bool {
            if self.offline {
                return false;
            }
            self.frames.lock().push(frame);
            true
        }
    }

    fn dispatcher(
        context: SessionContext,
    ) -> (
        CommandDispatcher,
        Arc<RecordingSink>,
        mpsc::UnboundedReceiver<LocalAction>,
    ) {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = mpsc::unbounded_channel();
        (CommandDispatcher::new(sink.clone(), context, tx), sink, rx)
    }

    #[test]
    fn test_blank_search_sends_nothing() {
        let (dispatcher, sink, _rx) = dispatcher(SessionContext::Peer);
        assert_eq!(dispatcher.search(""), Err(CommandError::EmptyQuery));
        assert_eq!(dispatcher.search("   "), Err(CommandError::EmptyQuery));
        assert_eq!(dispatcher.search("\t\n"), Err(CommandError::EmptyQuery));
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn test_search_sends_trimmed_query() {
        let (dispatcher, sink, _rx) = dispatcher(SessionContext::Peer);
        dispatcher.search("  daft punk ").unwrap();
        assert_eq!(
            sink.commands(),
            vec![ClientCommand::Search {
                query: "daft punk".to_string()
            }]
        );
    }

    #[test]
    fn test_queue_sends_uri_and_closes_search_panel() {
        let (dispatcher, sink, mut rx) = dispatcher(SessionContext::Peer);
        dispatcher.queue("spotify:track:1").unwrap();

        assert_eq!(
            sink.commands(),
            vec![ClientCommand::Queue {
                uri: "spotify:track:1".to_string()
            }]
        );
        assert_eq!(rx.try_recv().unwrap(), LocalAction::CloseSearchPanel);
    }

    #[test]
    fn test_queue_rejects_empty_track() {
        let (dispatcher, sink, mut rx) = dispatcher(SessionContext::Host);
        assert_eq!(dispatcher.queue(" "), Err(CommandError::EmptyTrackId));
        assert!(sink.commands().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_vote_sends_uri() {
        let (dispatcher, sink, _rx) = dispatcher(SessionContext::None);
        dispatcher.vote("t1").unwrap();
        assert_eq!(
            sink.commands(),
            vec![ClientCommand::Vote {
                uri: "t1".to_string()
            }]
        );
    }

    #[test]
    fn test_host_commands_allowed_for_host() {
        let (dispatcher, sink, _rx) = dispatcher(SessionContext::Host);
        dispatcher.request_devices().unwrap();
        dispatcher.transfer("device-1").unwrap();
        dispatcher.end_session().unwrap();

        assert_eq!(
            sink.commands(),
            vec![
                ClientCommand::Devices,
                ClientCommand::Transfer {
                    device_id: "device-1".to_string()
                },
                ClientCommand::Kill,
            ]
        );
    }

    #[test]
    fn test_host_commands_rejected_outside_host() {
        for context in [SessionContext::Peer, SessionContext::None] {
            let (dispatcher, sink, _rx) = dispatcher(context);
            assert_matches!(
                dispatcher.request_devices(),
                Err(CommandError::HostOnly { command: "Devices", .. })
            );
            assert_matches!(
                dispatcher.transfer("device-1"),
                Err(CommandError::HostOnly { command: "Transfer", .. })
            );
            assert_matches!(
                dispatcher.end_session(),
                Err(CommandError::HostOnly { command: "Kill", .. })
            );
            assert!(sink.commands().is_empty());
        }
    }

    #[test]
    fn test_transfer_rejects_empty_device() {
        let (dispatcher, _sink, _rx) = dispatcher(SessionContext::Host);
        assert_eq!(dispatcher.transfer(""), Err(CommandError::EmptyDeviceId));
    }

    #[test]
    fn test_sends_while_offline_are_silent() {
        let sink = Arc::new(RecordingSink {
            offline: true,
            ..Default::default()
        });
        let (tx, _rx) = mpsc::unbounded_channel();
        let dispatcher = CommandDispatcher::new(sink.clone(), SessionContext::Host, tx);

        dispatcher.request_state();
        assert!(dispatcher.vote("t1").is_ok());
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn test_leave_notifies_session_loop() {
        let (dispatcher, sink, mut rx) = dispatcher(SessionContext::Peer);
        dispatcher.leave();
        assert_eq!(rx.try_recv().unwrap(), LocalAction::Leave);
        assert!(sink.commands().is_empty());
    }
}
