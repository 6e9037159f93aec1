use std::time::Duration;

use serde::Deserialize;
use wshub_core::error::{Result, WsHubError};

use crate::transport::target::Location;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    pub version: u32,

    #[serde(default)]
    pub client: ClientSection,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            version: 1,
            client: ClientSection::default(),
        }
    }
}

impl HubConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WsHubError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.client.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    /// Location of the hosting page; the hub URL is derived from it.
    #[serde(default = "default_location")]
    pub location: String,

    /// Path segment appended to the page path.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Log every raw frame at debug level.
    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    #[serde(default = "default_request_id_len")]
    pub request_id_len: usize,

    /// Drop pending requests older than this. Unset: never expire.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            location: default_location(),
            endpoint: default_endpoint(),
            debug: false,
            outbound_queue: default_outbound_queue(),
            request_id_len: default_request_id_len(),
            request_timeout_ms: None,
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}

impl ClientSection {
    pub fn validate(&self) -> Result<()> {
        Location::parse(&self.location)
            .map_err(|e| WsHubError::Config(format!("client.location: {e}")))?;

        if self.endpoint.is_empty() || self.endpoint.contains(['?', '#']) {
            return Err(WsHubError::Config(
                "client.endpoint must be non-empty and must not contain '?' or '#'".into(),
            ));
        }
        if !(1..=65536).contains(&self.outbound_queue) {
            return Err(WsHubError::Config(
                "client.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        if !(4..=32).contains(&self.request_id_len) {
            return Err(WsHubError::Config(
                "client.request_id_len must be between 4 and 32".into(),
            ));
        }
        if let Some(ms) = self.request_timeout_ms {
            if !(1000..=3_600_000).contains(&ms) {
                return Err(WsHubError::Config(
                    "client.request_timeout_ms must be between 1000 and 3600000".into(),
                ));
            }
        }
        if !(100..=60000).contains(&self.sweep_interval_ms) {
            return Err(WsHubError::Config(
                "client.sweep_interval_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }

    /// `(max_age, sweep_every)` when request expiry is enabled.
    pub fn expiry(&self) -> Option<(Duration, Duration)> {
        self.request_timeout_ms.map(|ms| {
            (
                Duration::from_millis(ms),
                Duration::from_millis(self.sweep_interval_ms),
            )
        })
    }
}

fn default_location() -> String {
    "http://localhost:8080/".into()
}
fn default_endpoint() -> String {
    "hub".into()
}
fn default_outbound_queue() -> usize {
    256
}
fn default_request_id_len() -> usize {
    11
}
fn default_sweep_interval_ms() -> u64 {
    1000
}
