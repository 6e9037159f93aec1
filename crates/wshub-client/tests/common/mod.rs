//! Shared harness: a `HubClient` wired to an in-memory hub.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use wshub_client::transport::{MemoryPeer, MemoryTransport};
use wshub_client::{ConnState, HubClient, HubConfig};
use wshub_core::protocol::ServerMsg;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

pub struct Harness {
    pub client: HubClient,
    pub peer: MemoryPeer,
    pub url: String,
    updates: mpsc::UnboundedReceiver<Value>,
    flushes: u64,
}

/// Ids `x1`, `x2`, ... in issue order.
pub fn sequential_ids() -> impl Fn() -> String + Send + Sync + 'static {
    let n = Arc::new(AtomicUsize::new(0));
    move || format!("x{}", n.fetch_add(1, Ordering::SeqCst) + 1)
}

/// Client built on a memory transport, not yet connected.
pub fn client_with_peer(cfg: HubConfig) -> (HubClient, MemoryPeer) {
    let (transport, peer) = MemoryTransport::pair(64);
    let client = HubClient::builder(cfg)
        .client_id("test-client")
        .id_generator(sequential_ids())
        .transport(transport)
        .build();
    (client, peer)
}

pub async fn connected(cfg: HubConfig) -> Harness {
    init_tracing();
    let (client, mut peer) = client_with_peer(cfg);

    let (tx, updates) = mpsc::unbounded_channel();
    client.set_update_handler(move |u| {
        let _ = tx.send(u);
    });

    client.init_connection();
    let url = peer.connected_url().await.expect("transport never ran");
    wait_state(&client, ConnState::Open).await;

    Harness {
        client,
        peer,
        url,
        updates,
        flushes: 0,
    }
}

pub async fn wait_state(client: &HubClient, want: ConnState) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while client.state() != want {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("client never reached {want:?}, stuck in {:?}", client.state()));
}

impl Harness {
    /// Wait until every frame pushed so far has been dispatched.
    pub async fn flush(&mut self) {
        self.flushes += 1;
        let marker = json!({ "__flush": self.flushes });
        self.peer.push(&ServerMsg::update(marker.clone())).await.unwrap();
        loop {
            let got = tokio::time::timeout(Duration::from_secs(2), self.updates.recv())
                .await
                .expect("flush timed out")
                .expect("update channel closed");
            if got == marker {
                return;
            }
        }
    }

    /// Next update that is not a flush marker.
    pub async fn next_update(&mut self) -> Value {
        loop {
            let got = tokio::time::timeout(Duration::from_secs(2), self.updates.recv())
                .await
                .expect("no update")
                .expect("update channel closed");
            if got.get("__flush").is_none() {
                return got;
            }
        }
    }
}
