//! WebSocket transport (tokio-tungstenite).
//!
//! - Text frames out, one per envelope
//! - Text and Binary frames in (binary payloads are handed over as-is)
//! - Ping replies are queued by tungstenite itself; Pong is ignored
//! - Close from either side ends the connection; no reconnect

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use wshub_core::error::{Result, WsHubError};

use crate::transport::{ChannelEvent, Transport};

#[derive(Debug, Default, Clone)]
pub struct WsTransport;

impl WsTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn run(
        &self,
        url: String,
        events: mpsc::Sender<ChannelEvent>,
        mut outbound: mpsc::Receiver<String>,
    ) -> Result<()> {
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| WsHubError::Connect(e.to_string()))?;

        events
            .send(ChannelEvent::Opened)
            .await
            .map_err(|_| WsHubError::Internal("event channel closed".into()))?;

        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        loop {
            tokio::select! {
                // inbound reader
                incoming = ws_rx.next() => {
                    let frame = match incoming {
                        Some(Ok(Message::Text(s))) => Bytes::from(s),
                        Some(Ok(Message::Binary(b))) => Bytes::from(b),
                        Some(Ok(Message::Close(reason))) => {
                            tracing::info!(?reason, "server closed connection");
                            break;
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(WsHubError::Transport(e.to_string())),
                        None => break,
                    };
                    if events.send(ChannelEvent::Frame(frame)).await.is_err() {
                        break;
                    }
                }

                // outbound writer
                maybe_out = outbound.recv() => {
                    match maybe_out {
                        Some(text) => {
                            ws_tx
                                .send(Message::Text(text))
                                .await
                                .map_err(|e| WsHubError::Transport(e.to_string()))?;
                        }
                        None => {
                            let _ = ws_tx.send(Message::Close(None)).await;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
