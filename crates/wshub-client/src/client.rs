//! Public surface handed to the embedding application.
//!
//! `HubClient` is cheap to clone; every clone drives the same connection,
//! correlation table, and handlers. No operation returns an error: failures
//! are logged and the call becomes a no-op.

use std::sync::Arc;

use serde_json::Value;

use wshub_core::error::Result;
use wshub_core::protocol::{encode, ClientMsg, ServerChat};

use crate::config::{ClientSection, HubConfig};
use crate::correlation::CorrelationTable;
use crate::dispatch::Dispatcher;
use crate::ids::{random_id_generator, ClientId, IdGenerator};
use crate::transport::channel::{Channel, Expiry};
use crate::transport::{ConnState, HubTarget, Transport, WsTransport};

#[derive(Clone)]
pub struct HubClient {
    inner: Arc<HubClientInner>,
}

struct HubClientInner {
    cfg: ClientSection,
    client_id: ClientId,
    ids: IdGenerator,
    table: Arc<CorrelationTable>,
    dispatcher: Arc<Dispatcher>,
    channel: Arc<Channel>,
    transport: Arc<dyn Transport>,
}

pub struct HubClientBuilder {
    cfg: HubConfig,
    client_id: Option<ClientId>,
    ids: Option<IdGenerator>,
    transport: Option<Arc<dyn Transport>>,
}

impl HubClientBuilder {
    /// Use a fixed client id instead of the process-wide one.
    pub fn client_id(mut self, id: impl Into<Arc<str>>) -> Self {
        self.client_id = Some(ClientId::new(id));
        self
    }

    /// Replace the request id generator. It must not repeat a pending id.
    pub fn id_generator<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.ids = Some(Arc::new(f));
        self
    }

    /// Replace the WebSocket transport (e.g. with a `MemoryTransport`).
    pub fn transport<T: Transport>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build after validating the config.
    pub fn try_build(self) -> Result<HubClient> {
        self.cfg.validate()?;
        Ok(self.assemble())
    }

    /// Build; an invalid config is logged and replaced by the defaults.
    pub fn build(mut self) -> HubClient {
        if let Err(e) = self.cfg.validate() {
            tracing::error!(error = %e, "invalid client config; using defaults");
            self.cfg = HubConfig::default();
        }
        self.assemble()
    }

    fn assemble(self) -> HubClient {
        let cfg = self.cfg.client;
        let client_id = self.client_id.unwrap_or_else(ClientId::process);
        let ids = self
            .ids
            .unwrap_or_else(|| random_id_generator(cfg.request_id_len));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(WsTransport::new()));

        let table = Arc::new(CorrelationTable::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&table), cfg.debug));
        let channel = Arc::new(Channel::new(client_id.clone(), cfg.outbound_queue, cfg.debug));

        HubClient {
            inner: Arc::new(HubClientInner {
                cfg,
                client_id,
                ids,
                table,
                dispatcher,
                channel,
                transport,
            }),
        }
    }
}

impl HubClient {
    pub fn new(cfg: HubConfig) -> Self {
        Self::builder(cfg).build()
    }

    pub fn builder(cfg: HubConfig) -> HubClientBuilder {
        HubClientBuilder {
            cfg,
            client_id: None,
            ids: None,
            transport: None,
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.inner.client_id
    }

    /// Hub URL derived from the configured page location.
    pub fn target_url(&self) -> Result<String> {
        let cfg = &self.inner.cfg;
        HubTarget::from_location(&cfg.location, &cfg.endpoint, &self.inner.client_id)
            .map(|t| t.url().to_string())
    }

    /// Connect to the hub. No-op if already connecting or connected.
    pub fn init_connection(&self) {
        let url = match self.target_url() {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(error = %e, "failed to build WebSocket URL");
                return;
            }
        };
        tracing::info!(%url, "initiating WebSocket connection");

        let expiry = self
            .inner
            .cfg
            .expiry()
            .map(|(max_age, every)| Expiry { max_age, every });

        self.inner.channel.open(
            url,
            Arc::clone(&self.inner.transport),
            Arc::clone(&self.inner.dispatcher),
            expiry,
        );
    }

    pub fn is_ready(&self) -> bool {
        self.inner.channel.is_ready()
    }

    pub fn state(&self) -> ConnState {
        self.inner.channel.state()
    }

    /// Fire-and-forget send.
    pub fn notify(&self, msg: ClientMsg) {
        if !self.is_ready() {
            tracing::error!(msg_type = msg.kind(), "HubClient::notify called, but channel is not ready");
            return;
        }
        if let Err(e) = encode(&msg).and_then(|text| self.inner.channel.send(text)) {
            tracing::error!(error = %e, msg_type = msg.kind(), "failed to send notification");
        }
    }

    pub fn chat(&self, channel: &str, message: &str) {
        self.notify(ClientMsg::chat(channel, message));
    }

    pub fn control(&self, control_type: &str, control_key: &str) {
        self.notify(ClientMsg::control(control_type, control_key));
    }

    /// Send a request; `on_response` later receives the whole response object.
    ///
    /// Returns immediately with the generated request id, or `None` when the
    /// request was dropped (not ready, id collision, send failure). A dropped
    /// request never invokes its callback.
    pub fn request<F>(&self, request_type: &str, request_body: Value, on_response: F) -> Option<String>
    where
        F: FnOnce(Value) + Send + Sync + 'static,
    {
        if !self.is_ready() {
            tracing::error!(request_type, "HubClient::request called, but channel is not ready");
            return None;
        }

        let request_id = (self.inner.ids)();
        if let Err(e) = self
            .inner
            .table
            .register(request_id.clone(), Box::new(on_response))
        {
            tracing::error!(error = %e, request_type, "request dropped");
            return None;
        }

        let msg = ClientMsg::request(request_id.clone(), request_type, request_body);
        if let Err(e) = encode(&msg).and_then(|text| self.inner.channel.send(text)) {
            self.inner.table.cancel(&request_id);
            tracing::error!(error = %e, request_type, %request_id, "failed to send request");
            return None;
        }

        Some(request_id)
    }

    pub fn set_update_handler<F>(&self, f: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.inner.dispatcher.set_update_handler(f);
    }

    pub fn set_chat_handler<F>(&self, f: F)
    where
        F: Fn(&ServerChat) + Send + Sync + 'static,
    {
        self.inner.dispatcher.set_chat_handler(f);
    }

    /// Requests still waiting for their response.
    pub fn pending_requests(&self) -> usize {
        self.inner.table.len()
    }

    pub fn close(&self) {
        self.inner.channel.close();
    }
}
