//! The single connection of a client.
//!
//! Lifecycle: `Uninitialized -> Connecting -> Open -> Closed | Error`.
//! Every `open` starts a new epoch; events from an older connection never
//! touch the state of a newer one.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Interval, MissedTickBehavior};

use wshub_core::error::{Result, WsHubError};

use crate::dispatch::Dispatcher;
use crate::ids::ClientId;
use crate::transport::{ChannelEvent, Transport};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnState {
    Uninitialized = 0,
    Connecting = 1,
    Open = 2,
    Closed = 3,
    Error = 4,
}

impl ConnState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnState::Connecting,
            2 => ConnState::Open,
            3 => ConnState::Closed,
            4 => ConnState::Error,
            _ => ConnState::Uninitialized,
        }
    }

    /// A connection exists or is being established.
    pub fn is_live(self) -> bool {
        matches!(self, ConnState::Connecting | ConnState::Open)
    }
}

/// Request expiry driven by the inbound pump.
#[derive(Debug, Clone, Copy)]
pub struct Expiry {
    pub max_age: Duration,
    pub every: Duration,
}

pub struct Channel {
    client_id: ClientId,
    state: AtomicU8,
    epoch: AtomicU64,
    outbound: Mutex<Option<mpsc::Sender<String>>>,
    queue: usize,
    debug: bool,
}

impl Channel {
    pub fn new(client_id: ClientId, queue: usize, debug: bool) -> Self {
        Self {
            client_id,
            state: AtomicU8::new(ConnState::Uninitialized as u8),
            epoch: AtomicU64::new(0),
            outbound: Mutex::new(None),
            queue: queue.max(1),
            debug,
        }
    }

    pub fn state(&self) -> ConnState {
        ConnState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ConnState::Open
    }

    /// Start a connection to `url`. No-op if one is connecting or open.
    ///
    /// Must be called from within a Tokio runtime; otherwise the attempt is
    /// logged and abandoned.
    pub fn open(
        self: &Arc<Self>,
        url: String,
        transport: Arc<dyn Transport>,
        dispatcher: Arc<Dispatcher>,
        expiry: Option<Expiry>,
    ) {
        let current = self.state();
        if current.is_live() {
            tracing::info!(state = ?current, "WebSocket is already connected");
            return;
        }
        if self
            .state
            .compare_exchange(
                current as u8,
                ConnState::Connecting as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            tracing::info!("WebSocket connection attempt already in progress");
            return;
        }

        let rt = match tokio::runtime::Handle::try_current() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "failed to create WebSocket connection: no runtime");
                self.state.store(current as u8, Ordering::Release);
                return;
            }
        };

        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        let (out_tx, out_rx) = mpsc::channel::<String>(self.queue);
        let (ev_tx, ev_rx) = mpsc::channel::<ChannelEvent>(self.queue);
        *self.outbound.lock().unwrap_or_else(PoisonError::into_inner) = Some(out_tx);

        rt.spawn(async move {
            let res = transport.run(url, ev_tx.clone(), out_rx).await;
            if let Err(e) = res {
                let _ = ev_tx.send(ChannelEvent::Error(e.to_string())).await;
            }
            let _ = ev_tx.send(ChannelEvent::Closed).await;
        });

        rt.spawn(Arc::clone(self).pump(epoch, ev_rx, dispatcher, expiry));
    }

    /// Hand one text frame to the writer. Never waits.
    pub fn send(&self, text: String) -> Result<()> {
        if !self.is_ready() {
            return Err(WsHubError::NotReady);
        }
        let guard = self.outbound.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = guard.as_ref().ok_or(WsHubError::NotReady)?;
        if self.debug {
            tracing::debug!(frame = %text, "outbound frame");
        }
        tx.try_send(text).map_err(|e| match e {
            TrySendError::Full(_) => WsHubError::SendFailed("outbound queue full".into()),
            TrySendError::Closed(_) => WsHubError::SendFailed("connection writer closed".into()),
        })
    }

    /// Close the current connection. State is `Closed` immediately.
    pub fn close(&self) {
        let prev = self.state();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if prev.is_live() {
            self.state.store(ConnState::Closed as u8, Ordering::Release);
            tracing::info!(client_id = %self.client_id, "WebSocket closed by client");
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::Acquire) == epoch
    }

    fn transition(&self, epoch: u64, next: ConnState) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        self.state.store(next as u8, Ordering::Release);
        if !next.is_live() {
            self.outbound
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
        }
        true
    }

    /// Inbound loop: one event at a time, each routed to completion.
    ///
    /// Ends as soon as the channel moves to another epoch, so nothing from a
    /// closed or replaced connection reaches the dispatcher.
    async fn pump(
        self: Arc<Self>,
        epoch: u64,
        mut events: mpsc::Receiver<ChannelEvent>,
        dispatcher: Arc<Dispatcher>,
        expiry: Option<Expiry>,
    ) {
        let mut sweep = expiry.map(|e| {
            let mut tick = tokio::time::interval(e.every.max(MIN_SWEEP_INTERVAL));
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tick
        });

        loop {
            tokio::select! {
                ev = events.recv() => {
                    let Some(ev) = ev else { break; };
                    if !self.is_current(epoch) {
                        tracing::debug!(epoch, "connection superseded; inbound loop stopped");
                        break;
                    }
                    match ev {
                        ChannelEvent::Opened => {
                            if self.transition(epoch, ConnState::Open) {
                                tracing::info!(client_id = %self.client_id, "WebSocket connected");
                            }
                        }
                        ChannelEvent::Frame(frame) => {
                            dispatcher.route_frame(&frame);
                        }
                        ChannelEvent::Error(reason) => {
                            tracing::error!(%reason, "connection error");
                            self.transition(epoch, ConnState::Error);
                        }
                        ChannelEvent::Closed => {
                            if self.state() != ConnState::Error {
                                self.transition(epoch, ConnState::Closed);
                            }
                            tracing::info!(client_id = %self.client_id, "WebSocket connection closed");
                            break;
                        }
                    }
                }

                _ = next_sweep(&mut sweep) => {
                    if let Some(exp) = expiry {
                        let n = dispatcher.table().expire_older_than(exp.max_age);
                        if n > 0 {
                            tracing::warn!(expired = n, "expired pending requests");
                        }
                    }
                }
            }
        }
    }
}

async fn next_sweep(sweep: &mut Option<Interval>) {
    match sweep {
        Some(tick) => {
            tick.tick().await;
        }
        None => std::future::pending().await,
    }
}
