//! Pending-Search Table
//!
//! The central component tracking which callback belongs to which waiter.
//! Structure: `RequestId -> PendingSearch` in a concurrent `DashMap`; the
//! atomic `remove` on that map is the commit point that serializes a resolve
//! racing an expire on the same id.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::types::{RequestId, WaitHandle};
use crate::broadcast::types::{ClientEvent, ProductIdBatch};

/// How long a registered search waits for its callback before the waiter is
/// told it failed.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

const EXPIRY_REASON: &str = "Search timed out before any results arrived";

/// A registration awaiting its callback.
struct PendingSearch {
    /// The registrant's outbound queue.
    sink: mpsc::Sender<ClientEvent>,
    /// The timer that will expire this entry if no callback arrives.
    expiry: JoinHandle<()>,
}

/// Tracks in-flight search requests awaiting callback delivery.
pub struct CorrelationStore {
    /// Shared with the expiry timer tasks, which outlive the borrow that
    /// spawned them.
    pending: Arc<DashMap<RequestId, PendingSearch>>,
    timeout: Duration,
}

impl CorrelationStore {
    pub fn new(timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            pending: Arc::new(DashMap::new()),
            timeout,
        })
    }

    /// Registers a waiter for a request id and starts its expiry timer.
    ///
    /// Re-registering an id replaces the previous registration and cancels
    /// its timer, so a stale timer can never expire the new entry. Returns a
    /// token the registrant can use to recognize its own delivery.
    pub fn register(&self, request_id: RequestId, sink: mpsc::Sender<ClientEvent>) -> WaitHandle {
        let expiry = {
            let pending = self.pending.clone();
            let request_id = request_id.clone();
            let timeout = self.timeout;
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                expire_entry(&pending, &request_id);
            })
        };

        if let Some(previous) = self
            .pending
            .insert(request_id.clone(), PendingSearch { sink, expiry })
        {
            previous.expiry.abort();
            tracing::debug!("Replaced pending registration for request {}", request_id.0);
        }

        tracing::info!(
            "Registered search request {} (expires in {:?})",
            request_id.0,
            self.timeout
        );

        WaitHandle::new(request_id)
    }

    /// Delivers a result batch to the waiter registered for `request_id` and
    /// cancels the pending expiry.
    ///
    /// A callback for an unknown or already-expired id is not fatal (the
    /// search backend may be slow or retrying), so it is logged and dropped.
    /// Returns whether a registration was found.
    pub fn resolve(&self, request_id: &RequestId, batch: ProductIdBatch) -> bool {
        match self.pending.remove(request_id) {
            Some((_, entry)) => {
                entry.expiry.abort();

                if let Err(e) = entry.sink.try_send(ClientEvent::ProductIds(batch)) {
                    tracing::warn!(
                        "Registrant for request {} could not take delivery: {}",
                        request_id.0,
                        e
                    );
                }

                true
            }
            None => {
                tracing::info!(
                    "Dropping callback for unknown or expired request {}",
                    request_id.0
                );
                false
            }
        }
    }

    /// Gives up on a request that never received its callback.
    ///
    /// The waiter is notified of the failure; if the entry was already
    /// resolved this is a no-op.
    pub fn expire(&self, request_id: &RequestId) {
        expire_entry(&self.pending, request_id);
    }

    /// Whether a request id is still awaiting its callback.
    pub fn is_pending(&self, request_id: &RequestId) -> bool {
        self.pending.contains_key(request_id)
    }

    /// Returns the number of searches currently awaiting callbacks.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn expire_entry(pending: &DashMap<RequestId, PendingSearch>, request_id: &RequestId) {
    if let Some((_, entry)) = pending.remove(request_id) {
        tracing::warn!("Search request {} expired with no callback", request_id.0);

        let event = ClientEvent::SearchFailed {
            request_id: request_id.0.clone(),
            reason: EXPIRY_REASON.to_string(),
        };

        if entry.sink.try_send(event).is_err() {
            tracing::debug!("Registrant for request {} already gone", request_id.0);
        }
    }
}
