//! Shared test utilities for Jukebox workspace
//!
//! This crate provides mock implementations of the session server for
//! testing without network dependencies. These mocks are used by the
//! session client and CLI test suites.
//!
//! # Mock Services
//!
//! - [`MockConnector`] - Scriptable realtime link; the test plays the server end
//! - [`MockSessionServer`] - Mock HTTP endpoints of the session server
//! - [`RecordingView`] - View that records every call the session loop makes
//! - [`fixtures`] - Ready-made server frames
//!
//! # Example
//!
//! ```rust,ignore
//! use jukebox_test_utils::{fixtures, MockConnector, RecordingView};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let (connector, mut links) = MockConnector::new();
//!     // Build a SessionClient with Arc::new(connector) and spawn run()
//!
//!     let mut link = links.accept().await;
//!     link.push(fixtures::state_update(Some("t0"), &["t1"]));
//! }
//! ```

pub mod fixtures;
mod server;
mod transport;
mod view;

pub use server::MockSessionServer;
pub use transport::{MockConnector, MockLink, MockLinks};
pub use view::{RecordingView, ViewCall};
