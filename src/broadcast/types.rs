use serde::{Deserialize, Serialize};

/// Unique identifier for a live client connection.
///
/// Wrapper around a UUID string. A connection has no inherent identity tying
/// it to a particular search; the optional correlation happens through
/// connect-time metadata (see `handlers`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    /// Generates a new random UUID v4-based ConnectionId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered list of matched product identifiers delivered as one unit.
///
/// This is the payload carried across the callback boundary; on the wire it
/// is a plain JSON array of strings and nothing else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProductIdBatch(pub Vec<String>);

/// Events pushed to connected clients as JSON text frames.
///
/// Serialized as `{"event": <name>, "data": <payload>}` so a browser can
/// dispatch on the event name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// A result batch: `{"event": "productIds", "data": ["p1", "p2"]}`.
    ProductIds(ProductIdBatch),

    /// A registered search gave up waiting for its callback.
    #[serde(rename_all = "camelCase")]
    SearchFailed { request_id: String, reason: String },
}
