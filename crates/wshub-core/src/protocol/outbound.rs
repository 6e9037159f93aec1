//! Client -> hub envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WsHubError};

/// Chat line typed by the local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatNotify {
    pub channel: String,
    pub message: String,
}

/// Control command (key press, toggle, ...) initiated by the local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlNotify {
    pub control_type: String,
    pub control_key: String,
}

/// Notification body, tagged by `notify_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "notify_type", rename_all = "snake_case")]
pub enum ClientNotify {
    Chat { chat: ChatNotify },
    Control { control: ControlNotify },
}

/// Request body. `request_id` is only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRequest {
    pub request_id: String,
    pub request_type: String,
    pub request_body: Value,
}

/// Envelope sent to the hub, tagged by `msg_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum ClientMsg {
    Notify { notify: ClientNotify },
    Request { request: ClientRequest },
}

impl ClientMsg {
    /// `notify` envelope carrying a chat notification.
    pub fn chat(channel: impl Into<String>, message: impl Into<String>) -> Self {
        ClientMsg::Notify {
            notify: ClientNotify::Chat {
                chat: ChatNotify {
                    channel: channel.into(),
                    message: message.into(),
                },
            },
        }
    }

    /// `notify` envelope carrying a control notification.
    pub fn control(control_type: impl Into<String>, control_key: impl Into<String>) -> Self {
        ClientMsg::Notify {
            notify: ClientNotify::Control {
                control: ControlNotify {
                    control_type: control_type.into(),
                    control_key: control_key.into(),
                },
            },
        }
    }

    /// `request` envelope.
    pub fn request(
        request_id: impl Into<String>,
        request_type: impl Into<String>,
        request_body: Value,
    ) -> Self {
        ClientMsg::Request {
            request: ClientRequest {
                request_id: request_id.into(),
                request_type: request_type.into(),
                request_body,
            },
        }
    }

    /// Wire tag (`msg_type`).
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMsg::Notify { .. } => "notify",
            ClientMsg::Request { .. } => "request",
        }
    }

    /// Request id, if this is a request envelope.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ClientMsg::Request { request } => Some(request.request_id.as_str()),
            ClientMsg::Notify { .. } => None,
        }
    }
}

/// Serialize a client envelope to a JSON text frame.
pub fn encode(msg: &ClientMsg) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| WsHubError::Encode(e.to_string()))
}

/// Parse a client envelope (hub side of the wire).
pub fn decode_client(buf: &[u8]) -> Result<ClientMsg> {
    serde_json::from_slice(buf)
        .map_err(|e| WsHubError::Malformed(format!("invalid client envelope: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    #[test]
    fn chat_notify_shape() {
        let v = serde_json::to_value(ClientMsg::chat("general", "hi")).unwrap();
        assert_eq!(
            v,
            json!({
                "msg_type": "notify",
                "notify": { "notify_type": "chat", "chat": { "channel": "general", "message": "hi" } }
            })
        );
    }

    #[test]
    fn control_notify_shape() {
        let v = serde_json::to_value(ClientMsg::control("keydown", "W")).unwrap();
        assert_eq!(v["msg_type"], "notify");
        assert_eq!(v["notify"]["notify_type"], "control");
        assert_eq!(v["notify"]["control"]["control_type"], "keydown");
        assert_eq!(v["notify"]["control"]["control_key"], "W");
        assert!(v["notify"].get("chat").is_none());
    }

    #[test]
    fn request_shape_carries_opaque_body() {
        let msg = ClientMsg::request("x1", "ping", json!({"n": [1, 2]}));
        assert_eq!(msg.kind(), "request");
        assert_eq!(msg.request_id(), Some("x1"));

        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            v,
            json!({
                "msg_type": "request",
                "request": { "request_id": "x1", "request_type": "ping", "request_body": {"n": [1, 2]} }
            })
        );
        assert!(v.get("notify").is_none());
    }

    #[test]
    fn empty_strings_are_accepted() {
        let s = encode(&ClientMsg::chat("", "")).unwrap();
        assert_eq!(decode_client(s.as_bytes()).unwrap(), ClientMsg::chat("", ""));
    }
}
