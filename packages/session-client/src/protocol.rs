//! Session wire protocol
//!
//! Both directions use a JSON envelope tagged by `type`. Outbound commands
//! carry their fields inline (`{"type":"Vote","uri":"..."}`); inbound events
//! carry their data under `payload` (`{"type":"VotedTracks","payload":[...]}`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::models::{DeviceInfo, PlaybackState, SearchResults};

// =============================================================================
// Client -> Server Commands
// =============================================================================

/// Commands sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Search the catalog
    Search { query: String },

    /// Add a track to the shared queue
    Queue { uri: String },

    /// Vote for a queued track
    Vote { uri: String },

    /// Request a full playback state snapshot
    State,

    /// Request the host's playback devices (host only)
    Devices,

    /// Move playback to another device (host only)
    Transfer { device_id: String },

    /// End the session for everyone (host only)
    Kill,

    /// Request the set of tracks this client voted for
    VotedTracks,
}

impl ClientCommand {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::Search { .. } => "Search",
            ClientCommand::Queue { .. } => "Queue",
            ClientCommand::Vote { .. } => "Vote",
            ClientCommand::State => "State",
            ClientCommand::Devices => "Devices",
            ClientCommand::Transfer { .. } => "Transfer",
            ClientCommand::Kill => "Kill",
            ClientCommand::VotedTracks => "VotedTracks",
        }
    }

    /// Commands only the host may issue
    pub fn requires_host(&self) -> bool {
        matches!(
            self,
            ClientCommand::Devices | ClientCommand::Transfer { .. } | ClientCommand::Kill
        )
    }
}

// =============================================================================
// Server -> Client Events
// =============================================================================

/// Events pushed from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerEvent {
    /// Answer to a `Search` command
    SearchResult(SearchResults),

    /// Full playback state snapshot
    StateUpdate(PlaybackState),

    /// Full device list (host only)
    Devices(Vec<DeviceInfo>),

    /// Full set of track ids this client voted for
    VotedTracks(Vec<String>),

    /// Result code of a `Transfer` command (`"OK"` on success)
    Transfer(String),

    /// The session has ended
    Shutdown,
}

impl ServerEvent {
    /// Every event type this client understands
    pub const CATALOG: [&'static str; 6] = [
        "SearchResult",
        "StateUpdate",
        "Devices",
        "VotedTracks",
        "Transfer",
        "Shutdown",
    ];

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::SearchResult(_) => "SearchResult",
            ServerEvent::StateUpdate(_) => "StateUpdate",
            ServerEvent::Devices(_) => "Devices",
            ServerEvent::VotedTracks(_) => "VotedTracks",
            ServerEvent::Transfer(_) => "Transfer",
            ServerEvent::Shutdown => "Shutdown",
        }
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Serialize a command into a text frame
pub fn encode(command: &ClientCommand) -> Result<String, serde_json::Error> {
    serde_json::to_string(command)
}

/// Parse and validate an inbound text frame
///
/// Distinguishes malformed JSON, frames without a type, types outside the
/// catalog, and known events with a payload of the wrong shape.
pub fn decode(frame: &str) -> Result<ServerEvent, DecodeError> {
    let value: Value = serde_json::from_str(frame)?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_owned();

    if !ServerEvent::CATALOG.contains(&kind.as_str()) {
        return Err(DecodeError::UnknownType(kind));
    }

    // Shutdown carries no data; some servers still attach an empty payload
    if kind == "Shutdown" {
        return Ok(ServerEvent::Shutdown);
    }

    serde_json::from_value(value).map_err(|e| DecodeError::InvalidPayload {
        event: kind,
        reason: e.to_string(),
    })
}
