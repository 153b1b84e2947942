use serde::{Deserialize, Serialize};

use crate::broadcast::types::ClientEvent;

/// Unique identifier for an in-flight search request.
///
/// Wrapper around a UUID string. The id crosses the system end-to-end:
/// minted by the orchestrator, announced by the waiting connection, and
/// echoed back by the search backend's callback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generates a new random UUID v4-based RequestId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Token returned by `CorrelationStore::register`.
///
/// Lets the registrant recognize its own delivery among the events arriving
/// on its queue.
#[derive(Debug, Clone)]
pub struct WaitHandle {
    request_id: RequestId,
}

impl WaitHandle {
    pub(crate) fn new(request_id: RequestId) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Whether an event received on the registered queue belongs to this
    /// wait. Targeted `productIds` deliveries only ever arrive on the queue
    /// that registered the id; failure events carry the id explicitly.
    pub fn matches(&self, event: &ClientEvent) -> bool {
        match event {
            ClientEvent::ProductIds(_) => true,
            ClientEvent::SearchFailed { request_id, .. } => request_id == &self.request_id.0,
        }
    }
}
