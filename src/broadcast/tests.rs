//! Broadcast Module Tests
//!
//! Validates the connection registry and the fan-out semantics.
//!
//! ## Test Scopes
//! - **Fan-out**: every active connection receives every batch, in call
//!   order, with no replay for late subscribers.
//! - **Lifecycle**: disconnects and closed queues prune the active set.
//! - **Backpressure**: a stalled connection is evicted when its bounded
//!   queue overflows.
//! - **Wire shape**: events serialize to the frames browsers dispatch on.
//!
//! *Note: the WebSocket session pump is exercised end-to-end against a
//! running relay; unit tests here focus on the registry.*

#[cfg(test)]
mod tests {
    use crate::broadcast::registry::{CLIENT_QUEUE_DEPTH, ConnectionRegistry};
    use crate::broadcast::types::{ClientEvent, ProductIdBatch};

    fn product_event(ids: &[&str]) -> ClientEvent {
        ClientEvent::ProductIds(ProductIdBatch(
            ids.iter().map(|id| id.to_string()).collect(),
        ))
    }

    // ============================================================
    // FAN-OUT
    // ============================================================

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection() {
        // ARRANGE: three connected clients
        let registry = ConnectionRegistry::new();
        let (_id1, mut rx1) = registry.subscribe();
        let (_id2, mut rx2) = registry.subscribe();
        let (_id3, mut rx3) = registry.subscribe();

        // ACT
        let event = product_event(&["p1", "p2", "p3"]);
        let delivered = registry.broadcast(&event);

        // ASSERT: all three receive a payload deep-equal to the posted one
        assert_eq!(delivered, 3);
        assert_eq!(rx1.recv().await, Some(event.clone()));
        assert_eq!(rx2.recv().await, Some(event.clone()));
        assert_eq!(rx3.recv().await, Some(event));
    }

    #[tokio::test]
    async fn test_broadcast_preserves_order_per_connection() {
        let registry = ConnectionRegistry::new();
        let (_id, mut rx) = registry.subscribe();

        let b1 = product_event(&["first"]);
        let b2 = product_event(&["second"]);

        registry.broadcast(&b1);
        registry.broadcast(&b2);

        assert_eq!(rx.recv().await, Some(b1));
        assert_eq!(rx.recv().await, Some(b2));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_batches() {
        let registry = ConnectionRegistry::new();

        registry.broadcast(&product_event(&["early"]));

        // Connecting after the broadcast completed: no replay.
        let (_id, mut rx) = registry.subscribe();
        assert!(rx.try_recv().is_err());

        let later = product_event(&["later"]);
        registry.broadcast(&later);
        assert_eq!(rx.recv().await, Some(later));
    }

    // ============================================================
    // LIFECYCLE
    // ============================================================

    #[tokio::test]
    async fn test_unsubscribe_removes_connection() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = registry.subscribe();
        assert_eq!(registry.connection_count(), 1);

        registry.unsubscribe(&id);

        assert_eq!(registry.connection_count(), 0);
        assert!(!registry.is_connected(&id));
        assert_eq!(registry.broadcast(&product_event(&["p1"])), 0);
    }

    #[tokio::test]
    async fn test_closed_receiver_is_pruned_on_broadcast() {
        let registry = ConnectionRegistry::new();
        let (id, rx) = registry.subscribe();

        // Simulate a connection whose session task already died.
        drop(rx);

        assert_eq!(registry.broadcast(&product_event(&["p1"])), 0);
        assert!(!registry.is_connected(&id));
    }

    // ============================================================
    // BACKPRESSURE
    // ============================================================

    #[tokio::test]
    async fn test_stalled_connection_is_evicted_on_overflow() {
        // ARRANGE: one client that never drains its queue
        let registry = ConnectionRegistry::new();
        let (id, mut rx) = registry.subscribe();

        // ACT: fill the queue to its bound
        for _ in 0..CLIENT_QUEUE_DEPTH {
            assert_eq!(registry.broadcast(&product_event(&["p"])), 1);
        }

        // One more overflows and evicts the stalled client.
        assert_eq!(registry.broadcast(&product_event(&["overflow"])), 0);

        // ASSERT
        assert!(!registry.is_connected(&id));
        assert_eq!(registry.connection_count(), 0);

        // The buffered events are still drainable; the overflowing one was
        // never queued.
        for _ in 0..CLIENT_QUEUE_DEPTH {
            assert_eq!(rx.recv().await, Some(product_event(&["p"])));
        }
        assert_eq!(rx.recv().await, None);
    }

    // ============================================================
    // WIRE SHAPE
    // ============================================================

    #[test]
    fn test_product_ids_event_wire_shape() {
        let event = product_event(&["p1", "p2"]);
        let json = serde_json::to_string(&event).unwrap();

        assert_eq!(json, r#"{"event":"productIds","data":["p1","p2"]}"#);
    }

    #[test]
    fn test_search_failed_event_wire_shape() {
        let event = ClientEvent::SearchFailed {
            request_id: "req-1".to_string(),
            reason: "timed out".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();

        assert_eq!(
            json,
            r#"{"event":"searchFailed","data":{"requestId":"req-1","reason":"timed out"}}"#
        );
    }
}
