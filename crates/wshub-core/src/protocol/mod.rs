//! Hub wire protocol (JSON text envelopes).
//!
//! Every frame is a JSON object tagged by `msg_type`:
//! - client -> hub: `notify` (fire-and-forget) and `request` (expects one `response`).
//! - hub -> client: `chat`, `update` (push) and `response` (correlated reply).
//!
//! The tag alone decides which payload field is present. Decoding probes the
//! tag first and only then reads the payload, so a missing or foreign tag is
//! reported as such instead of as a generic parse failure.

pub mod inbound;
pub mod outbound;

pub use inbound::{decode, encode_server, ServerChat, ServerMsg, ServerResponse};
pub use outbound::{
    decode_client, encode, ChatNotify, ClientMsg, ClientNotify, ClientRequest, ControlNotify,
};
