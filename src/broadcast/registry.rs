//! Connection Registry
//!
//! The single mutation point for the active-connection set. Each connection
//! is represented by the sending half of a bounded mpsc channel; the
//! receiving half is pumped into the WebSocket by the connection's session
//! task (see `handlers`).

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::types::{ClientEvent, ConnectionId};

/// Number of undelivered events a single connection may buffer before it is
/// considered stalled and dropped.
pub const CLIENT_QUEUE_DEPTH: usize = 32;

/// Registry holding the outbound queue of every live connection.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, mpsc::Sender<ClientEvent>>,
}

impl ConnectionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            connections: DashMap::new(),
        })
    }

    /// Adds a new connection to the active set.
    ///
    /// Returns the connection's id and the receiving end of its bounded
    /// event queue. Events queued before this call are never replayed.
    pub fn subscribe(&self) -> (ConnectionId, mpsc::Receiver<ClientEvent>) {
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_DEPTH);
        let id = ConnectionId::new();
        self.connections.insert(id.clone(), tx);

        tracing::info!(
            "Client {} connected ({} active)",
            id.0,
            self.connections.len()
        );

        (id, rx)
    }

    /// Removes a connection from the active set.
    ///
    /// Safe to call for an id that was already removed (disconnect and
    /// overflow eviction can race).
    pub fn unsubscribe(&self, id: &ConnectionId) {
        if self.connections.remove(id).is_some() {
            tracing::info!(
                "Client {} disconnected ({} active)",
                id.0,
                self.connections.len()
            );
        }
    }

    /// Whether the connection is still part of the active set.
    pub fn is_connected(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    /// A clone of the connection's outbound queue, used to register the
    /// connection as the targeted recipient of a specific search.
    pub fn sender(&self, id: &ConnectionId) -> Option<mpsc::Sender<ClientEvent>> {
        self.connections.get(id).map(|entry| entry.value().clone())
    }

    /// Returns the number of currently connected clients.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Queues an event for every member of the active set, in call order.
    ///
    /// A connection whose queue is full is evicted: the queue bound is the
    /// backpressure policy for stalled consumers. Returns the number of
    /// connections the event was queued for.
    pub fn broadcast(&self, event: &ClientEvent) -> usize {
        let targets: Vec<(ConnectionId, mpsc::Sender<ClientEvent>)> = self
            .connections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in targets {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!("Client {} queue overflowed, dropping connection", id.0);
                    self.unsubscribe(&id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!("Client {} queue already closed", id.0);
                    self.unsubscribe(&id);
                }
            }
        }

        delivered
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }
}
