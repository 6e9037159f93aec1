//! Transport layer (channel facade).
//!
//! `Channel` owns the single connection of a client: its state, the outbound
//! writer, and the inbound pump that feeds the dispatcher. Transports only move
//! text frames; they know nothing about envelopes.

pub mod channel;
pub mod memory;
pub mod target;
pub mod ws;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use wshub_core::error::Result;

pub use channel::{Channel, ConnState};
pub use memory::{MemoryPeer, MemoryTransport};
pub use target::{HubTarget, Location};
pub use ws::WsTransport;

/// Lifecycle and data events reported by a transport to its channel.
#[derive(Debug)]
pub enum ChannelEvent {
    /// Connection established; sends may start.
    Opened,
    /// One inbound frame (text or binary payload).
    Frame(Bytes),
    /// Connection failed or broke.
    Error(String),
    /// Connection ended.
    Closed,
}

/// A duplex frame carrier for one connection attempt.
///
/// `run` connects to `url`, reports `Opened`, then forwards inbound frames as
/// `Frame` events and writes every string received on `outbound`. It returns
/// `Ok(())` when either side closes (`outbound` closing means the client asked
/// to close) and `Err` when the connection fails. `Error`/`Closed` events are
/// emitted by the channel from that result, not by the transport.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn run(
        &self,
        url: String,
        events: mpsc::Sender<ChannelEvent>,
        outbound: mpsc::Receiver<String>,
    ) -> Result<()>;
}
