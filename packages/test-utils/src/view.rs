//! Recording view for session loop tests

use std::sync::Arc;
use std::time::Duration;

use jukebox_session_client::{
    ConnectionStatus, DeviceInfo, PlaybackState, SearchResults, SessionView, VoteControl,
    VotedTrackSet,
};
use parking_lot::Mutex;
use url::Url;

/// One call made by the session loop, reduced to ids for easy comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    ConnectionChanged(ConnectionStatus),
    RenderState {
        current: Option<String>,
        queue: Vec<String>,
    },
    SearchResults(Vec<String>),
    DevicePicker(Vec<String>),
    VoteControls(Vec<VoteControl>),
    CloseDevicePanel,
    CloseSearchPanel,
    ExitSession(String),
}

/// View that records every call
///
/// Clones share one log, so a test can keep a clone while the session loop
/// owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    calls: Arc<Mutex<Vec<ViewCall>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all calls so far
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&ViewCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    /// Wait until a call matching `predicate` is recorded
    pub async fn wait_for(&self, predicate: impl Fn(&ViewCall) -> bool) -> ViewCall {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(call) = self.calls.lock().iter().find(|call| predicate(call)) {
                return call.clone();
            }
            if tokio::time::Instant::now() >= deadline {
                panic!("expected view call was not recorded: {:?}", self.calls());
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn record(&self, call: ViewCall) {
        self.calls.lock().push(call);
    }
}

impl SessionView for RecordingView {
    fn connection_changed(&mut self, status: ConnectionStatus) {
        self.record(ViewCall::ConnectionChanged(status));
    }

    fn render_state(&mut self, state: &PlaybackState, _voted: &VotedTrackSet) {
        self.record(ViewCall::RenderState {
            current: state.current_track.as_ref().map(|t| t.id.clone()),
            queue: state.queue.iter().map(|t| t.id.clone()).collect(),
        });
    }

    fn render_search_results(&mut self, results: &SearchResults) {
        self.record(ViewCall::SearchResults(
            results.tracks.iter().map(|t| t.id.clone()).collect(),
        ));
    }

    fn show_device_picker(&mut self, devices: &[DeviceInfo]) {
        self.record(ViewCall::DevicePicker(
            devices.iter().map(|d| d.id.clone()).collect(),
        ));
    }

    fn update_vote_controls(&mut self, controls: &[VoteControl]) {
        self.record(ViewCall::VoteControls(controls.to_vec()));
    }

    fn close_device_panel(&mut self) {
        self.record(ViewCall::CloseDevicePanel);
    }

    fn close_search_panel(&mut self) {
        self.record(ViewCall::CloseSearchPanel);
    }

    fn exit_session(&mut self, logout_url: &Url) {
        self.record(ViewCall::ExitSession(logout_url.to_string()));
    }
}
