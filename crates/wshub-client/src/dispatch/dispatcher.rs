use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use wshub_core::error::{Result, WsHubError};
use wshub_core::protocol::{decode, ServerChat, ServerMsg};

use crate::correlation::CorrelationTable;

/// Receives hub world updates (opaque payload).
pub type UpdateHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Receives hub chat lines.
pub type ChatHandler = Arc<dyn Fn(&ServerChat) + Send + Sync>;

/// Where an inbound envelope ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Chat,
    Update,
    /// `delivered` is false when no request was pending for the id.
    Response { request_id: String, delivered: bool },
}

/// Inbound router: `chat` -> chat handler, `update` -> update handler,
/// `response` -> correlation table.
pub struct Dispatcher {
    table: Arc<CorrelationTable>,
    on_update: RwLock<UpdateHandler>,
    on_chat: RwLock<ChatHandler>,
    debug: bool,
}

impl Dispatcher {
    pub fn new(table: Arc<CorrelationTable>, debug: bool) -> Self {
        Self {
            table,
            on_update: RwLock::new(Arc::new(log_update) as UpdateHandler),
            on_chat: RwLock::new(Arc::new(log_chat) as ChatHandler),
            debug,
        }
    }

    pub fn set_update_handler<F>(&self, f: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        *self.on_update.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(f);
    }

    pub fn set_chat_handler<F>(&self, f: F)
    where
        F: Fn(&ServerChat) + Send + Sync + 'static,
    {
        *self.on_chat.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(f);
    }

    pub fn table(&self) -> &CorrelationTable {
        &self.table
    }

    /// Decode and route one frame; decode failures are returned, not logged.
    pub fn dispatch_bytes(&self, buf: &[u8]) -> Result<Routed> {
        if self.debug {
            tracing::debug!(frame = %String::from_utf8_lossy(buf), "inbound frame");
        }
        let msg = decode(buf)?;
        Ok(self.dispatch(msg))
    }

    /// Route one frame, logging and discarding anything undeliverable.
    pub fn route_frame(&self, buf: &[u8]) -> Option<Routed> {
        match self.dispatch_bytes(buf) {
            Ok(routed) => Some(routed),
            Err(WsHubError::MissingType) => {
                tracing::error!("server message has no type; discarded");
                None
            }
            Err(WsHubError::UnknownType(msg_type)) => {
                tracing::error!(%msg_type, "server message has unknown type; discarded");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, code = e.code().as_str(), "failed to parse server message; discarded");
                None
            }
        }
    }

    pub fn dispatch(&self, msg: ServerMsg) -> Routed {
        match msg {
            ServerMsg::Chat { chat } => {
                let handler: ChatHandler = self.on_chat.read().unwrap_or_else(PoisonError::into_inner).clone();
                handler(&chat);
                Routed::Chat
            }
            ServerMsg::Update { world_update } => {
                let handler: UpdateHandler = self.on_update.read().unwrap_or_else(PoisonError::into_inner).clone();
                handler(world_update);
                Routed::Update
            }
            ServerMsg::Response { response } => {
                let request_id = response.request_id.clone();
                let delivered = self.table.resolve(&request_id, response.into_value());
                Routed::Response {
                    request_id,
                    delivered,
                }
            }
        }
    }
}

fn log_chat(chat: &ServerChat) {
    tracing::info!(
        "CHAT Channel: {} User: {} Message: {}",
        chat.channel,
        chat.username,
        chat.message
    );
}

fn log_update(update: Value) {
    tracing::info!(%update, "world update");
}
