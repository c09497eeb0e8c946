//! Rendering seam
//!
//! The session core never draws anything itself. A front-end implements
//! [`SessionView`] and receives complete snapshots to render; every method
//! has a no-op default so a view only implements what it shows.

use url::Url;

use crate::connection::ConnectionStatus;
use crate::models::{DeviceInfo, PlaybackState, SearchResults, VoteControl, VotedTrackSet};

/// Front-end driven by the session loop
///
/// All calls happen on the session loop task, one at a time.
pub trait SessionView: Send {
    /// The logical connection changed state
    fn connection_changed(&mut self, _status: ConnectionStatus) {}

    /// Redraw the now-playing card and the queue
    ///
    /// `voted` is the last known vote set; it may lag behind `state` until
    /// the follow-up `VotedTracks` answer arrives.
    fn render_state(&mut self, _state: &PlaybackState, _voted: &VotedTrackSet) {}

    fn render_search_results(&mut self, _results: &SearchResults) {}

    /// Show the device picker with the host's devices
    fn show_device_picker(&mut self, _devices: &[DeviceInfo]) {}

    /// Enable or disable the vote control of each displayed queue entry
    fn update_vote_controls(&mut self, _controls: &[VoteControl]) {}

    fn close_device_panel(&mut self) {}

    fn close_search_panel(&mut self) {}

    /// Leave the session UI and navigate to `logout_url`
    fn exit_session(&mut self, _logout_url: &Url) {}
}

/// View that renders nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl SessionView for NullView {}
