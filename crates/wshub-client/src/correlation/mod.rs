//! Request/response correlation.
//!
//! Re-exports the pending-request table so the client and dispatcher can
//! depend on this module directly.

pub mod table;

pub use table::{CorrelationTable, ResponseCallback};
