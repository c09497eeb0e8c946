//! Ready-made server frames and models

use jukebox_session_client::{
    DeviceInfo, DeviceType, PlaybackState, SearchResults, ServerEvent, TrackInfo,
};

/// Track whose name and artist derive from its id
pub fn track(id: &str) -> TrackInfo {
    TrackInfo::new(id, format!("Track {}", id), [format!("Artist {}", id)])
}

pub fn device(id: &str, device_type: DeviceType) -> DeviceInfo {
    DeviceInfo {
        id: id.to_string(),
        name: format!("Device {}", id),
        device_type,
    }
}

pub fn playback(current: Option<&str>, queue: &[&str]) -> PlaybackState {
    PlaybackState {
        current_track: current.map(track),
        queue: queue.iter().map(|id| track(id)).collect(),
    }
}

/// `StateUpdate` frame
pub fn state_update(current: Option<&str>, queue: &[&str]) -> String {
    frame(&ServerEvent::StateUpdate(playback(current, queue)))
}

/// `VotedTracks` frame
pub fn voted_tracks(ids: &[&str]) -> String {
    frame(&ServerEvent::VotedTracks(
        ids.iter().map(|id| id.to_string()).collect(),
    ))
}

/// `SearchResult` frame
pub fn search_result(ids: &[&str]) -> String {
    frame(&ServerEvent::SearchResult(SearchResults {
        tracks: ids.iter().map(|id| track(id)).collect(),
    }))
}

/// `Devices` frame
pub fn devices(ids: &[&str]) -> String {
    frame(&ServerEvent::Devices(
        ids.iter().map(|id| device(id, DeviceType::Speaker)).collect(),
    ))
}

/// `Transfer` result frame
pub fn transfer(code: &str) -> String {
    frame(&ServerEvent::Transfer(code.to_string()))
}

/// `Shutdown` frame
pub fn shutdown() -> String {
    frame(&ServerEvent::Shutdown)
}

fn frame(event: &ServerEvent) -> String {
    serde_json::to_string(event).expect("server event serializes")
}
