//! Hub -> client envelopes.
//!
//! Decoding is two-step: a cheap header probe reads `msg_type` only, then the
//! full envelope is parsed for known tags. The probe ignores every other field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WsHubError};

/// Tags this client understands.
pub const SERVER_MSG_TYPES: [&str; 3] = ["chat", "update", "response"];

/// Chat line pushed by the hub. Absent fields decode as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerChat {
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub message: String,
}

/// Reply to a previous request. Every field besides `request_id` is body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub request_id: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ServerResponse {
    /// The whole response object, `request_id` included, as handed to callbacks.
    pub fn into_value(self) -> Value {
        let mut obj = self.body;
        obj.insert("request_id".to_string(), Value::String(self.request_id));
        Value::Object(obj)
    }
}

/// Envelope received from the hub, tagged by `msg_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum ServerMsg {
    Chat {
        chat: ServerChat,
    },
    Update {
        #[serde(default)]
        world_update: Value,
    },
    Response {
        response: ServerResponse,
    },
}

impl ServerMsg {
    pub fn chat(
        channel: impl Into<String>,
        username: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ServerMsg::Chat {
            chat: ServerChat {
                channel: channel.into(),
                username: username.into(),
                message: message.into(),
            },
        }
    }

    pub fn update(world_update: Value) -> Self {
        ServerMsg::Update { world_update }
    }

    /// Response whose body is the fields of `body` (non-object bodies land under `"body"`).
    pub fn response(request_id: impl Into<String>, body: Value) -> Self {
        let body = match body {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("body".to_string(), other);
                map
            }
        };
        ServerMsg::Response {
            response: ServerResponse {
                request_id: request_id.into(),
                body,
            },
        }
    }

    /// Wire tag (`msg_type`).
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMsg::Chat { .. } => "chat",
            ServerMsg::Update { .. } => "update",
            ServerMsg::Response { .. } => "response",
        }
    }
}

#[derive(Deserialize)]
struct Header {
    #[serde(default)]
    msg_type: Option<String>,
}

/// Decode a hub frame.
///
/// - not a JSON object, or payload not matching its tag => `Malformed`
/// - no `msg_type` => `MissingType`
/// - `msg_type` outside [`SERVER_MSG_TYPES`] => `UnknownType`
pub fn decode(buf: &[u8]) -> Result<ServerMsg> {
    let header: Header = serde_json::from_slice(buf)
        .map_err(|e| WsHubError::Malformed(format!("invalid envelope json: {e}")))?;

    let tag = header.msg_type.ok_or(WsHubError::MissingType)?;
    if !SERVER_MSG_TYPES.contains(&tag.as_str()) {
        return Err(WsHubError::UnknownType(tag));
    }

    serde_json::from_slice(buf)
        .map_err(|e| WsHubError::Malformed(format!("invalid {tag} payload: {e}")))
}

/// Serialize a hub envelope (hub side of the wire, test hubs, memory peers).
pub fn encode_server(msg: &ServerMsg) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| WsHubError::Encode(e.to_string()))
}
