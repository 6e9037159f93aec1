//! Dispatcher module exports.
//!
//! Re-exports the inbound router and handler types so downstream consumers can
//! depend on this module directly.

pub mod dispatcher;

pub use dispatcher::{ChatHandler, Dispatcher, Routed, UpdateHandler};
