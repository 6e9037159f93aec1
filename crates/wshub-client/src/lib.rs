//! wshub client runtime.
//!
//! Multiplexes notifications, correlated requests, and hub pushes over one
//! WebSocket connection:
//! - `correlation`: pending request id -> response callback (at-most-once)
//! - `dispatch`: inbound frame -> chat handler / update handler / correlation
//! - `transport`: connection target, connection state, WebSocket + in-memory transports
//! - `client`: the `HubClient` surface handed to the embedding application
//!
//! Every public operation absorbs its failures into `tracing` logs; nothing
//! inbound can tear the connection down.

pub mod client;
pub mod config;
pub mod correlation;
pub mod dispatch;
pub mod ids;
pub mod transport;

pub use client::{HubClient, HubClientBuilder};
pub use config::{ClientSection, HubConfig};
pub use transport::ConnState;
