//! Session client error types
//!
//! Every failure in the session core is recoverable: transport failures are
//! absorbed by reconnecting, decode failures drop the offending frame, and
//! command validation failures mean the command is simply not sent.

use thiserror::Error;

use crate::models::SessionContext;

/// Failures of the realtime link
#[derive(Error, Debug)]
pub enum TransportError {
    /// The link could not be opened
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// The link was closed underneath us
    #[error("link closed")]
    Closed,

    /// WebSocket protocol or I/O failure
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Inbound frames that could not be turned into a [`ServerEvent`](crate::ServerEvent)
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Frame is not valid JSON
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Frame has no string `type` field
    #[error("frame has no event type")]
    MissingType,

    /// `type` names an event outside the catalog
    #[error("unknown event type: {0}")]
    UnknownType(String),

    /// Known event whose payload does not match its shape
    #[error("invalid payload for {event}: {reason}")]
    InvalidPayload { event: String, reason: String },
}

/// Commands rejected before reaching the wire
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Search query was empty after trimming
    #[error("search query is empty")]
    EmptyQuery,

    /// Track id was empty
    #[error("track id is empty")]
    EmptyTrackId,

    /// Device id was empty
    #[error("device id is empty")]
    EmptyDeviceId,

    /// Command requires host permissions
    #[error("{command} is only available to the host (context: {context})")]
    HostOnly {
        command: &'static str,
        context: SessionContext,
    },
}

/// Failures of the plain HTTP collaborators
#[derive(Error, Debug)]
pub enum HttpError {
    /// Invalid input provided to a request method
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    /// Response body could not be interpreted
    #[error("failed to parse response from {endpoint}: {reason}")]
    Parse { endpoint: String, reason: String },

    /// Request timeout
    #[error("request to session server timed out")]
    Timeout,
}

impl HttpError {
    /// Check if this error is retryable (transient failure)
    ///
    /// Retries on timeouts, connect failures and server errors (5xx).
    /// Client errors (4xx) and local validation failures are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::Timeout => true,
            HttpError::Request(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error())
            }
            HttpError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for HTTP collaborator operations
pub type HttpResult<T> = Result<T, HttpError>;

/// Result type for dispatcher operations
pub type CommandResult<T> = Result<T, CommandError>;
