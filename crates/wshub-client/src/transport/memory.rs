//! In-memory transport for tests and in-process hubs.
//!
//! `MemoryTransport::pair` returns the client half (plugged into a
//! `HubClient`) and a `MemoryPeer` that plays the hub: it sees the URL the
//! client connected to, reads what the client sent, and pushes frames back.
//! Each transport serves a single connection.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, oneshot, Mutex};

use wshub_core::error::{Result, WsHubError};
use wshub_core::protocol::{decode_client, encode_server, ClientMsg, ServerMsg};

use crate::transport::{ChannelEvent, Transport};

enum PeerFrame {
    Frame(Bytes),
    Close,
}

struct PeerLink {
    to_peer: mpsc::Sender<String>,
    from_peer: mpsc::Receiver<PeerFrame>,
    url_tx: oneshot::Sender<String>,
}

pub struct MemoryTransport {
    link: Mutex<Option<PeerLink>>,
}

/// Hub side of a [`MemoryTransport`].
pub struct MemoryPeer {
    from_client: mpsc::Receiver<String>,
    to_client: mpsc::Sender<PeerFrame>,
    url_rx: Option<oneshot::Receiver<String>>,
}

impl MemoryTransport {
    pub fn pair(buffer_size: usize) -> (Self, MemoryPeer) {
        let buffer_size = buffer_size.max(1);
        let (client_to_peer_tx, client_to_peer_rx) = mpsc::channel(buffer_size);
        let (peer_to_client_tx, peer_to_client_rx) = mpsc::channel(buffer_size);
        let (url_tx, url_rx) = oneshot::channel();

        let transport = Self {
            link: Mutex::new(Some(PeerLink {
                to_peer: client_to_peer_tx,
                from_peer: peer_to_client_rx,
                url_tx,
            })),
        };
        let peer = MemoryPeer {
            from_client: client_to_peer_rx,
            to_client: peer_to_client_tx,
            url_rx: Some(url_rx),
        };
        (transport, peer)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn run(
        &self,
        url: String,
        events: mpsc::Sender<ChannelEvent>,
        mut outbound: mpsc::Receiver<String>,
    ) -> Result<()> {
        let Some(link) = self.link.lock().await.take() else {
            return Err(WsHubError::Connect("memory transport already used".into()));
        };
        let PeerLink {
            to_peer,
            mut from_peer,
            url_tx,
        } = link;

        let _ = url_tx.send(url);
        events
            .send(ChannelEvent::Opened)
            .await
            .map_err(|_| WsHubError::Internal("event channel closed".into()))?;

        loop {
            tokio::select! {
                frame = from_peer.recv() => {
                    match frame {
                        Some(PeerFrame::Frame(b)) => {
                            if events.send(ChannelEvent::Frame(b)).await.is_err() {
                                break;
                            }
                        }
                        Some(PeerFrame::Close) | None => break,
                    }
                }

                maybe_out = outbound.recv() => {
                    match maybe_out {
                        Some(text) => {
                            to_peer
                                .send(text)
                                .await
                                .map_err(|_| WsHubError::Transport("memory peer dropped".into()))?;
                        }
                        None => break,
                    }
                }
            }
        }

        Ok(())
    }
}

impl MemoryPeer {
    /// URL the client connected with; `None` if the transport was dropped unused.
    pub async fn connected_url(&mut self) -> Option<String> {
        self.url_rx.take()?.await.ok()
    }

    /// Next raw frame written by the client.
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Next frame written by the client, parsed as a client envelope.
    pub async fn recv_msg(&mut self) -> Option<Result<ClientMsg>> {
        let text = self.from_client.recv().await?;
        Some(decode_client(text.as_bytes()))
    }

    /// Raw frame already written by the client, if any.
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }

    pub async fn push(&self, msg: &ServerMsg) -> Result<()> {
        self.push_raw(encode_server(msg)?).await
    }

    /// Push an arbitrary frame (malformed input included).
    pub async fn push_raw(&self, frame: impl Into<Bytes>) -> Result<()> {
        self.to_client
            .send(PeerFrame::Frame(frame.into()))
            .await
            .map_err(|_| WsHubError::Transport("client side closed".into()))
    }

    /// End the connection from the hub side.
    pub async fn close(&self) {
        let _ = self.to_client.send(PeerFrame::Close).await;
    }
}
