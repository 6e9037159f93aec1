//! Top-level facade crate for wshub.
//!
//! Re-exports the wire protocol and the client runtime so applications can
//! depend on a single crate.
//!
//! ```no_run
//! use serde_json::json;
//! use wshub::client::{HubClient, HubConfig};
//!
//! # async fn run() {
//! let client = HubClient::new(HubConfig::default());
//! client.set_update_handler(|update| tracing::info!(%update, "world"));
//! client.init_connection();
//!
//! // later, once `client.is_ready()`:
//! client.chat("general", "hello");
//! client.request("ping", json!({}), |response| tracing::info!(%response, "pong"));
//! # }
//! ```

pub mod core {
    pub use wshub_core::*;
}

pub mod client {
    pub use wshub_client::*;
}
