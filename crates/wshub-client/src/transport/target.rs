//! Connection target: hosting page location -> hub WebSocket URL.
//!
//! `<ws|wss>://<host><path><endpoint>?client_id=<id>`; `wss` iff the page is
//! served over `https` (or already `wss`).

use std::fmt;

use wshub_core::error::{Result, WsHubError};

use crate::ids::ClientId;

/// The parts of a page location the hub URL is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub scheme: String,
    pub host: String,
    /// Path without query or fragment; always starts with `/`.
    pub path: String,
}

impl Location {
    pub fn parse(s: &str) -> Result<Self> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| WsHubError::InvalidTarget(format!("missing scheme: {s}")))?;

        let rest = rest
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let (host, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, "/"),
        };
        if host.is_empty() {
            return Err(WsHubError::InvalidTarget(format!("missing host: {s}")));
        }

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    /// WebSocket scheme matching the page's security.
    pub fn ws_scheme(&self) -> Result<&'static str> {
        match self.scheme.as_str() {
            "http" | "ws" => Ok("ws"),
            "https" | "wss" => Ok("wss"),
            other => Err(WsHubError::InvalidTarget(format!(
                "unsupported scheme: {other}"
            ))),
        }
    }
}

/// Fully resolved hub URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubTarget {
    url: String,
}

impl HubTarget {
    pub fn new(location: &Location, endpoint: &str, client_id: &ClientId) -> Result<Self> {
        let scheme = location.ws_scheme()?;
        Ok(Self {
            url: format!(
                "{scheme}://{}{}{endpoint}?client_id={client_id}",
                location.host, location.path
            ),
        })
    }

    pub fn from_location(location: &str, endpoint: &str, client_id: &ClientId) -> Result<Self> {
        Self::new(&Location::parse(location)?, endpoint, client_id)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for HubTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
