//! Local mirror of the session state
//!
//! The store holds exactly one snapshot of each piece of server state. Every
//! mutation replaces a whole piece, so applying the same event twice leaves
//! the store as if it had been applied once. Mutations are crate-private:
//! only the event router writes here.

use crate::models::{
    DeviceInfo, PlaybackState, SearchResults, TrackInfo, VoteControl, VotedTrackSet,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStateStore {
    /// `None` until the first `StateUpdate` arrives
    playback: Option<PlaybackState>,
    voted: VotedTrackSet,
    devices: Vec<DeviceInfo>,
    search_results: SearchResults,
}

impl SessionStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any playback snapshot has been received yet
    pub fn is_synced(&self) -> bool {
        self.playback.is_some()
    }

    /// Latest playback snapshot, `None` while still unknown
    pub fn playback(&self) -> Option<&PlaybackState> {
        self.playback.as_ref()
    }

    /// Currently playing track
    ///
    /// `None` both while unknown and while nothing plays; use
    /// [`playback`](Self::playback) to tell the two apart.
    pub fn current_track(&self) -> Option<&TrackInfo> {
        self.playback.as_ref().and_then(|p| p.current_track.as_ref())
    }

    /// Queue in server order (empty while unknown)
    pub fn queue(&self) -> &[TrackInfo] {
        self.playback
            .as_ref()
            .map(|p| p.queue.as_slice())
            .unwrap_or_default()
    }

    pub fn voted(&self) -> &VotedTrackSet {
        &self.voted
    }

    pub fn devices(&self) -> &[DeviceInfo] {
        &self.devices
    }

    pub fn search_results(&self) -> &SearchResults {
        &self.search_results
    }

    /// Vote control state for every queue entry, in queue order
    pub fn vote_controls(&self) -> Vec<VoteControl> {
        vote_controls(self.queue(), &self.voted)
    }

    pub(crate) fn replace_playback(&mut self, state: PlaybackState) {
        self.playback = Some(state);
    }

    pub(crate) fn replace_voted(&mut self, voted: VotedTrackSet) {
        self.voted = voted;
    }

    pub(crate) fn replace_devices(&mut self, devices: Vec<DeviceInfo>) {
        self.devices = devices;
    }

    pub(crate) fn replace_search_results(&mut self, results: SearchResults) {
        self.search_results = results;
    }
}

/// Disable exactly the controls of tracks present in `voted`
pub fn vote_controls(queue: &[TrackInfo], voted: &VotedTrackSet) -> Vec<VoteControl> {
    queue
        .iter()
        .map(|track| VoteControl {
            track_id: track.id.clone(),
            enabled: !voted.contains(&track.id),
        })
        .collect()
}
