use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;

use wshub_core::error::{Result, WsHubError};

/// Consumes the response of one request. `FnOnce`: at most one delivery.
pub type ResponseCallback = Box<dyn FnOnce(Value) + Send + Sync + 'static>;

struct Pending {
    callback: ResponseCallback,
    registered_at: Instant,
}

/// Pending requests: `request_id -> callback`.
///
/// An entry lives from `register` until its response is resolved. Without
/// expiry, an entry whose response never arrives stays for the whole session.
#[derive(Default)]
pub struct CorrelationTable {
    pending: DashMap<String, Pending>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }

    /// Record the callback for `request_id`. A still-pending id is rejected
    /// and the existing entry is left in place.
    pub fn register(&self, request_id: String, callback: ResponseCallback) -> Result<()> {
        match self.pending.entry(request_id) {
            Entry::Occupied(e) => Err(WsHubError::DuplicateRequestId(e.key().clone())),
            Entry::Vacant(e) => {
                tracing::debug!(request_id = %e.key(), "registered pending request");
                e.insert(Pending {
                    callback,
                    registered_at: Instant::now(),
                });
                Ok(())
            }
        }
    }

    /// Hand `response` to the callback registered for `request_id`.
    ///
    /// The entry is removed before the callback runs, so the callback may
    /// register new requests. Returns `false` for late, duplicate, or
    /// unsolicited responses.
    pub fn resolve(&self, request_id: &str, response: Value) -> bool {
        match self.pending.remove(request_id) {
            Some((_, pending)) => {
                tracing::debug!(
                    request_id,
                    waited_ms = pending.registered_at.elapsed().as_millis() as u64,
                    "delivering response"
                );
                (pending.callback)(response);
                true
            }
            None => {
                tracing::warn!(request_id, "response has no pending request; discarded");
                false
            }
        }
    }

    /// Drop an entry without invoking it. Returns whether it existed.
    pub(crate) fn cancel(&self, request_id: &str) -> bool {
        self.pending.remove(request_id).is_some()
    }

    /// Drop entries registered more than `max_age` ago, without invoking them.
    pub fn expire_older_than(&self, max_age: Duration) -> usize {
        let stale: Vec<String> = self
            .pending
            .iter()
            .filter(|e| e.value().registered_at.elapsed() >= max_age)
            .map(|e| e.key().clone())
            .collect();

        let mut expired = 0;
        for id in stale {
            if self
                .pending
                .remove_if(&id, |_, p| p.registered_at.elapsed() >= max_age)
                .is_some()
            {
                tracing::warn!(request_id = %id, "pending request expired without response");
                expired += 1;
            }
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Sorted ids of pending requests (diagnostics).
    pub fn pending_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pending.iter().map(|e| e.key().clone()).collect();
        ids.sort_unstable();
        ids
    }
}
