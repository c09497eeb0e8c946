//! Realtime session synchronization client for Jukebox
//!
//! This crate keeps one participant of a live listening session in sync with
//! the session server:
//! - A single logical WebSocket connection with reconnect and backoff
//! - A local mirror of playback, queue, votes and devices
//! - Validated commands (search, queue, vote, host-only device control)
//! - Server events applied to the mirror and handed to a [`SessionView`]
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use jukebox_session_client::{NullView, SessionClient, SessionContext, WsConnector};
//! use jukebox_shared_config::{ReconnectConfig, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = ServerConfig::with_url("https://jukebox.example")?;
//! let mut client = SessionClient::new(
//!     Arc::new(WsConnector::new()),
//!     &server,
//!     ReconnectConfig::default(),
//!     SessionContext::Peer,
//!     NullView,
//! );
//!
//! // Commands can be issued from any task
//! let dispatcher = client.dispatcher().clone();
//! tokio::spawn(async move {
//!     let _ = dispatcher.search("daft punk");
//! });
//!
//! let exit = client.run().await;
//! println!("{}", exit);
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! See `jukebox-shared-config` for `JUKEBOX_SERVER_URL`, `JUKEBOX_WS_PATH`
//! and the reconnect settings.

mod connection;
mod dispatcher;
mod error;
mod http;
mod models;
mod protocol;
mod router;
mod session;
mod store;
mod transport;
mod view;

pub use connection::{
    CommandSink, ConnectionEvent, ConnectionEventKind, ConnectionManager, ConnectionStatus,
};
pub use dispatcher::{CommandDispatcher, LocalAction};
pub use error::{CommandError, CommandResult, DecodeError, HttpError, HttpResult, TransportError};
pub use http::SessionHttpClient;
pub use models::{
    DeviceInfo, DeviceType, PlaybackState, SearchResults, SessionContext, TrackInfo, VoteControl,
    VotedTrackSet,
};
pub use protocol::{decode, encode, ClientCommand, ServerEvent};
pub use router::{EventRouter, RouteOutcome, SessionExit, TRANSFER_OK};
pub use session::SessionClient;
pub use store::{vote_controls, SessionStateStore};
pub use transport::{Connector, Link, LinkSink, LinkStream, WsConnector};
pub use view::{NullView, SessionView};
