//! Terminal rendering of the session

use jukebox_session_client::{
    ConnectionStatus, DeviceInfo, PlaybackState, SearchResults, SessionContext, SessionView,
    TrackInfo, VoteControl, VotedTrackSet,
};
use url::Url;

/// Prints session updates to stdout
#[derive(Debug)]
pub struct TerminalView {
    context: SessionContext,
}

impl TerminalView {
    pub fn new(context: SessionContext) -> Self {
        Self { context }
    }
}

impl SessionView for TerminalView {
    fn connection_changed(&mut self, status: ConnectionStatus) {
        println!("[{}] {}", self.context, status);
    }

    fn render_state(&mut self, state: &PlaybackState, voted: &VotedTrackSet) {
        println!("{}", format_state(state, voted));
    }

    fn render_search_results(&mut self, results: &SearchResults) {
        if results.tracks.is_empty() {
            println!("no results");
            return;
        }
        for track in &results.tracks {
            println!("  {}", format_track(track));
        }
    }

    fn show_device_picker(&mut self, devices: &[DeviceInfo]) {
        println!("devices:");
        for device in devices {
            println!("  {}  {} ({})", device.id, device.name, device.device_type);
        }
    }

    fn update_vote_controls(&mut self, controls: &[VoteControl]) {
        let voted = controls.iter().filter(|c| !c.enabled).count();
        println!("voted for {} of {} queued tracks", voted, controls.len());
    }

    fn close_device_panel(&mut self) {
        println!("playback transferred");
    }

    fn exit_session(&mut self, logout_url: &Url) {
        println!("session over, logging out via {}", logout_url);
    }
}

fn format_track(track: &TrackInfo) -> String {
    format!("{}  {} - {}", track.id, track.name, track.artist_line())
}

/// Now-playing line followed by the queue, voted entries marked with `*`
fn format_state(state: &PlaybackState, voted: &VotedTrackSet) -> String {
    let mut lines = Vec::with_capacity(state.queue.len() + 2);
    match &state.current_track {
        Some(track) => lines.push(format!("now playing: {}", format_track(track))),
        None => lines.push("nothing playing".to_string()),
    }

    if state.queue.is_empty() {
        lines.push("queue is empty".to_string());
    }
    for (position, track) in state.queue.iter().enumerate() {
        let mark = if voted.contains(&track.id) { '*' } else { ' ' };
        lines.push(format!("{:>3}.{} {}", position + 1, mark, format_track(track)));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> TrackInfo {
        TrackInfo::new(id, format!("Song {}", id), ["Band"])
    }

    #[test]
    fn test_format_state_marks_votes() {
        let state = PlaybackState {
            current_track: Some(track("t0")),
            queue: vec![track("t1"), track("t2")],
        };
        let voted: VotedTrackSet = ["t2"].into_iter().collect();

        assert_eq!(
            format_state(&state, &voted),
            "now playing: t0  Song t0 - Band\n  1.  t1  Song t1 - Band\n  2.* t2  Song t2 - Band"
        );
    }

    #[test]
    fn test_format_state_empty() {
        let rendered = format_state(&PlaybackState::default(), &VotedTrackSet::new());
        assert_eq!(rendered, "nothing playing\nqueue is empty");
    }
}
