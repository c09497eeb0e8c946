//! Session data model
//!
//! These types mirror the payloads the session server pushes. Everything the
//! server sends is a complete snapshot, so none of these types offer
//! incremental mutation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

// =============================================================================
// Tracks
// =============================================================================

/// A track as reported by the session server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Opaque track identifier (also used as the queue/vote uri)
    pub id: String,
    pub name: String,
    /// Artist names in credit order
    pub artists: Vec<String>,
}

impl TrackInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artists: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: artists.into_iter().map(Into::into).collect(),
        }
    }

    /// Artists joined for display, e.g. "Daft Punk, Pharrell Williams"
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// Result of a track search, replaced wholesale on every response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub tracks: Vec<TrackInfo>,
}

/// Full authoritative playback state at a point in time
///
/// The queue order is decided by the server; the client never reorders it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Currently playing track (`None` when nothing is playing)
    #[serde(rename = "track")]
    pub current_track: Option<TrackInfo>,

    /// Upcoming tracks in server priority order
    pub queue: Vec<TrackInfo>,
}

// =============================================================================
// Devices
// =============================================================================

/// Playback device the host can transfer to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "type", alias = "_type")]
    pub device_type: DeviceType,
}

/// Device type categories
///
/// Unrecognized names from the server map to `Unknown` instead of failing
/// the whole device list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum DeviceType {
    Computer,
    Tablet,
    Smartphone,
    Speaker,
    Tv,
    #[default]
    Unknown,
}

impl std::str::FromStr for DeviceType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "computer" => DeviceType::Computer,
            "tablet" => DeviceType::Tablet,
            "smartphone" => DeviceType::Smartphone,
            "speaker" => DeviceType::Speaker,
            "tv" => DeviceType::Tv,
            _ => DeviceType::Unknown,
        })
    }
}

impl From<String> for DeviceType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceType::Computer => write!(f, "computer"),
            DeviceType::Tablet => write!(f, "tablet"),
            DeviceType::Smartphone => write!(f, "smartphone"),
            DeviceType::Speaker => write!(f, "speaker"),
            DeviceType::Tv => write!(f, "tv"),
            DeviceType::Unknown => write!(f, "unknown"),
        }
    }
}

// =============================================================================
// Votes
// =============================================================================

/// Track ids this client has voted for in the current session
///
/// Only ever replaced as a whole by the server's answer; never unioned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VotedTrackSet(HashSet<String>);

impl VotedTrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.0.contains(track_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for VotedTrackSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Enabled state of the vote control for one displayed queue entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteControl {
    pub track_id: String,
    /// `false` once the server confirmed our vote for this track
    pub enabled: bool,
}

// =============================================================================
// Session context
// =============================================================================

/// Role of this participant, fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionContext {
    Host,
    Peer,
    #[default]
    None,
}

impl SessionContext {
    /// Only the host may list devices, transfer playback or end the session
    pub fn is_host(&self) -> bool {
        matches!(self, SessionContext::Host)
    }
}

impl std::fmt::Display for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionContext::Host => write!(f, "host"),
            SessionContext::Peer => write!(f, "peer"),
            SessionContext::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for SessionContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "host" => Ok(SessionContext::Host),
            "peer" => Ok(SessionContext::Peer),
            "none" => Ok(SessionContext::None),
            other => Err(format!("unknown session context '{}'", other)),
        }
    }
}
