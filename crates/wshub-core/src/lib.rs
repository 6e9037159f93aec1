//! wshub core: transport-agnostic envelope protocol and error types.
//!
//! This crate defines the wire-level contract between a hub client and the
//! hub: the tagged outbound/inbound envelopes, their JSON codec, and the error
//! surface shared by the client runtime. It carries no transport or runtime
//! dependencies so it can be reused by servers, test hubs, and tooling.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed inbound
//! traffic surfaces as `WsHubError` so a bad frame can never take the
//! connection (or the process) down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, Result, WsHubError};
pub use protocol::{ClientMsg, ClientNotify, ServerMsg};
