//! Connection lifecycle, push routing, and failure absorption.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use wshub_client::{ConnState, HubClient, HubConfig};
use wshub_core::protocol::{ClientMsg, ServerMsg};

use common::{client_with_peer, connected, wait_state};

#[tokio::test]
async fn sends_before_init_are_dropped() {
    common::init_tracing();
    let (client, mut peer) = client_with_peer(HubConfig::default());
    assert_eq!(client.state(), ConnState::Uninitialized);
    assert!(!client.is_ready());

    let called = Arc::new(Mutex::new(false));
    let c = Arc::clone(&called);
    client.notify(ClientMsg::chat("general", "hello?"));
    client.control("keydown", "W");
    assert_eq!(client.request("ping", json!({}), move |_| *c.lock().unwrap() = true), None);
    assert_eq!(client.pending_requests(), 0);

    client.init_connection();
    peer.connected_url().await.unwrap();
    wait_state(&client, ConnState::Open).await;

    // Nothing queued from the not-ready period.
    assert!(peer.try_recv().is_none());
    assert!(!*called.lock().unwrap());
}

#[tokio::test]
async fn target_url_carries_client_id() {
    let mut cfg = HubConfig::default();
    cfg.client.location = "https://game.example.com/arena/".into();
    let h = connected(cfg).await;
    assert_eq!(h.url, "wss://game.example.com/arena/hub?client_id=test-client");
    assert_eq!(h.client.client_id().as_str(), "test-client");
}

#[tokio::test]
async fn reinit_while_open_is_a_no_op() {
    let mut h = connected(HubConfig::default()).await;
    h.client.init_connection();
    h.client.init_connection();
    assert_eq!(h.client.state(), ConnState::Open);

    h.client.chat("general", "still here");
    let sent = h.peer.recv_msg().await.unwrap().unwrap();
    assert_eq!(sent, ClientMsg::chat("general", "still here"));
}

#[tokio::test]
async fn notifications_reach_the_hub_in_order() {
    let mut h = connected(HubConfig::default()).await;
    h.client.chat("general", "one");
    h.client.control("keyup", "Space");
    h.client.notify(ClientMsg::chat("team", "two"));

    assert_eq!(h.peer.recv_msg().await.unwrap().unwrap(), ClientMsg::chat("general", "one"));
    assert_eq!(h.peer.recv_msg().await.unwrap().unwrap(), ClientMsg::control("keyup", "Space"));
    assert_eq!(h.peer.recv_msg().await.unwrap().unwrap(), ClientMsg::chat("team", "two"));
}

#[tokio::test]
async fn pushes_reach_their_handlers() {
    let mut h = connected(HubConfig::default()).await;
    let chats = Arc::new(Mutex::new(Vec::new()));
    let c = Arc::clone(&chats);
    h.client.set_chat_handler(move |chat| c.lock().unwrap().push(chat.clone()));

    h.peer.push(&ServerMsg::chat("general", "alice", "hi")).await.unwrap();
    h.peer.push(&ServerMsg::update(json!({"tick": 7}))).await.unwrap();

    assert_eq!(h.next_update().await, json!({"tick": 7}));
    let chats = chats.lock().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].username, "alice");
    assert_eq!(chats[0].message, "hi");
}

#[tokio::test]
async fn garbage_never_closes_the_connection() {
    let mut h = connected(HubConfig::default()).await;
    for frame in [
        "not json at all",
        r#"{"no_type":true}"#,
        r#"{"msg_type":"presence"}"#,
        r#"{"msg_type":"response","response":{"pong":true}}"#,
        r#"{"msg_type":"chat","chat":{}}"#,
    ] {
        h.peer.push_raw(frame).await.unwrap();
    }
    h.flush().await;

    assert_eq!(h.client.state(), ConnState::Open);
    h.client.chat("general", "ok");
    assert_eq!(h.peer.recv_msg().await.unwrap().unwrap(), ClientMsg::chat("general", "ok"));
}

#[tokio::test]
async fn hub_close_is_final() {
    let h = connected(HubConfig::default()).await;
    h.peer.close().await;
    wait_state(&h.client, ConnState::Closed).await;

    assert!(h.client.request("ping", json!({}), |_| {}).is_none());
    h.client.chat("general", "into the void");
}

#[tokio::test]
async fn client_close_then_reopen_needs_a_new_transport() {
    let h = connected(HubConfig::default()).await;
    h.client.close();
    assert_eq!(h.client.state(), ConnState::Closed);
    assert!(!h.client.is_ready());

    // The memory transport serves one connection; a second attempt fails and
    // lands in Error instead of panicking.
    h.client.init_connection();
    wait_state(&h.client, ConnState::Error).await;
}

#[tokio::test]
async fn pending_requests_leak_without_expiry() {
    let mut h = connected(HubConfig::default()).await;
    h.client.request("ping", json!({}), |_| {});
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.flush().await;
    assert_eq!(h.client.pending_requests(), 1);
}

#[tokio::test]
async fn expiry_drops_stale_callbacks() {
    let mut cfg = HubConfig::default();
    cfg.client.request_timeout_ms = Some(1000);
    cfg.client.sweep_interval_ms = 100;
    let mut h = connected(cfg).await;

    let called = Arc::new(Mutex::new(false));
    let c = Arc::clone(&called);
    h.client.request("ping", json!({}), move |_| *c.lock().unwrap() = true).unwrap();
    assert_eq!(h.client.pending_requests(), 1);

    tokio::time::timeout(Duration::from_secs(5), async {
        while h.client.pending_requests() > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .unwrap();

    h.peer.push(&ServerMsg::response("x1", json!({}))).await.unwrap();
    h.flush().await;
    assert!(!*called.lock().unwrap());
}

#[test]
fn init_outside_runtime_is_absorbed() {
    let client = HubClient::builder(HubConfig::default())
        .client_id("no-runtime")
        .build();
    client.init_connection();
    assert_eq!(client.state(), ConnState::Uninitialized);
}

#[tokio::test]
async fn invalid_location_is_absorbed() {
    let mut cfg = HubConfig::default();
    cfg.client.location = "gopher://old.example.com/".into();
    let (client, _peer) = client_with_peer(cfg);
    assert!(client.target_url().is_err());
    client.init_connection();
    assert_eq!(client.state(), ConnState::Uninitialized);
}

#[tokio::test]
async fn frames_queued_behind_close_are_dropped() {
    common::init_tracing();
    let (client, mut peer) = client_with_peer(HubConfig::default());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let closer = client.clone();
    client.set_update_handler(move |u| {
        s.lock().unwrap().push(u);
        closer.close();
    });

    client.init_connection();
    peer.connected_url().await.unwrap();
    wait_state(&client, ConnState::Open).await;

    for n in 0..20 {
        let _ = peer.push(&ServerMsg::update(json!({ "n": n }))).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(client.state(), ConnState::Closed);
    assert_eq!(*seen.lock().unwrap(), vec![json!({ "n": 0 })]);
}

#[tokio::test]
async fn zero_sweep_interval_falls_back_to_defaults() {
    let mut cfg = HubConfig::default();
    cfg.client.request_timeout_ms = Some(1000);
    cfg.client.sweep_interval_ms = 0;

    let h = connected(cfg).await;
    assert!(h.client.is_ready());
}

#[tokio::test]
async fn zero_id_len_falls_back_to_defaults() {
    let mut cfg = HubConfig::default();
    cfg.client.request_id_len = 0;
    let (transport, mut peer) = wshub_client::transport::MemoryTransport::pair(16);
    let client = HubClient::builder(cfg)
        .client_id("test-client")
        .transport(transport)
        .build();

    client.init_connection();
    peer.connected_url().await.unwrap();
    wait_state(&client, ConnState::Open).await;

    let a = client.request("ping", json!({}), |_| {}).unwrap();
    let b = client.request("ping", json!({}), |_| {}).unwrap();
    assert_eq!(a.len(), 11);
    assert_ne!(a, b);
    assert_eq!(client.pending_requests(), 2);
}

#[test]
fn try_build_rejects_invalid_config() {
    let mut cfg = HubConfig::default();
    cfg.client.outbound_queue = 0;
    let err = HubClient::builder(cfg).try_build().err().unwrap();
    assert_eq!(err.code().as_str(), "CONFIG");
}
