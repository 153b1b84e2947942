//! Callback Ingress Tests
//!
//! Validates the public contract of `POST /api/callback`: shape validation
//! at the boundary, the acknowledgement bodies, and the hand-off to either
//! the broadcaster or the correlation store.
//!
//! ## Test Scopes
//! - **Validation**: only a JSON array of strings is accepted; every other
//!   shape is rejected with the exact error body and no side effects.
//! - **Delivery**: id-less callbacks fan out to every client; id-carrying
//!   callbacks reach only the registered waiter.

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::extract::{Extension, Query};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::broadcast::registry::ConnectionRegistry;
    use crate::broadcast::types::{ClientEvent, ProductIdBatch};
    use crate::callback::handlers::{CallbackParams, handle_callback, parse_batch};
    use crate::callback::protocol::{CallbackAck, CallbackRejection, REJECT_NOT_AN_ARRAY};
    use crate::correlation::store::CorrelationStore;
    use crate::correlation::types::RequestId;

    fn test_state() -> (Arc<ConnectionRegistry>, Arc<CorrelationStore>) {
        (
            ConnectionRegistry::new(),
            CorrelationStore::new(Duration::from_secs(60)),
        )
    }

    async fn post(
        registry: &Arc<ConnectionRegistry>,
        store: &Arc<CorrelationStore>,
        request_id: Option<&str>,
        payload: Value,
    ) -> Result<(StatusCode, Json<CallbackAck>), (StatusCode, Json<CallbackRejection>)> {
        handle_callback(
            Query(CallbackParams {
                request_id: request_id.map(str::to_string),
            }),
            Extension(registry.clone()),
            Extension(store.clone()),
            Json(payload),
        )
        .await
    }

    // ============================================================
    // VALIDATION
    // ============================================================

    #[test]
    fn test_parse_batch_accepts_string_array_in_order() {
        let batch = parse_batch(&json!(["p1", "p2", "p3"])).unwrap();

        assert_eq!(
            batch,
            ProductIdBatch(vec!["p1".to_string(), "p2".to_string(), "p3".to_string()])
        );
    }

    #[test]
    fn test_parse_batch_accepts_empty_array() {
        assert_eq!(parse_batch(&json!([])), Some(ProductIdBatch(vec![])));
    }

    #[test]
    fn test_parse_batch_rejects_non_array_shapes() {
        for payload in [
            json!({"ids": ["p1"]}),
            json!(42),
            json!("p1"),
            json!(null),
            json!(true),
        ] {
            assert_eq!(parse_batch(&payload), None, "accepted {:?}", payload);
        }
    }

    #[test]
    fn test_parse_batch_rejects_mixed_element_types() {
        assert_eq!(parse_batch(&json!(["p1", 2, "p3"])), None);
        assert_eq!(parse_batch(&json!([["p1"]])), None);
    }

    #[tokio::test]
    async fn test_object_payload_is_rejected_without_side_effects() {
        // ARRANGE: a connected client that must see nothing
        let (registry, store) = test_state();
        let (_id, mut rx) = registry.subscribe();

        // ACT
        let response = post(&registry, &store, None, json!({"ids": ["p1"]})).await;

        // ASSERT: exact rejection body, no broadcast
        let (status, Json(rejection)) = response.expect_err("object payload must be rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(rejection.error, REJECT_NOT_AN_ARRAY);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_scalar_and_null_payloads_are_rejected() {
        let (registry, store) = test_state();
        let (_id, mut rx) = registry.subscribe();

        for payload in [json!(7), json!("p1"), json!(null)] {
            let response = post(&registry, &store, None, payload).await;
            let (status, Json(rejection)) = response.expect_err("non-array must be rejected");
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(rejection.error, REJECT_NOT_AN_ARRAY);
        }

        assert!(rx.try_recv().is_err());
    }

    // ============================================================
    // DELIVERY
    // ============================================================

    #[tokio::test]
    async fn test_valid_callback_broadcasts_to_all_clients() {
        // ARRANGE: two connected clients
        let (registry, store) = test_state();
        let (_id1, mut rx1) = registry.subscribe();
        let (_id2, mut rx2) = registry.subscribe();

        // ACT
        let response = post(&registry, &store, None, json!(["p1", "p2", "p3"])).await;

        // ASSERT: acknowledged, and both clients hold the posted array
        let (status, Json(ack)) = response.expect("valid payload must be accepted");
        assert_eq!(status, StatusCode::OK);
        assert!(ack.success);

        let expected = ClientEvent::ProductIds(ProductIdBatch(vec![
            "p1".to_string(),
            "p2".to_string(),
            "p3".to_string(),
        ]));
        assert_eq!(rx1.recv().await, Some(expected.clone()));
        assert_eq!(rx2.recv().await, Some(expected));
    }

    #[tokio::test]
    async fn test_callback_with_request_id_targets_registrant_only() {
        // ARRANGE: a registered waiter and an unrelated spectator
        let (registry, store) = test_state();
        let (waiter_id, mut waiter_rx) = registry.subscribe();
        let (_other_id, mut other_rx) = registry.subscribe();

        let request_id = RequestId::new();
        store.register(request_id.clone(), registry.sender(&waiter_id).unwrap());

        // ACT
        let response = post(&registry, &store, Some(&request_id.0), json!(["x"])).await;

        // ASSERT: only the waiter takes delivery
        let (status, Json(ack)) = response.expect("valid payload must be accepted");
        assert_eq!(status, StatusCode::OK);
        assert!(ack.success);

        assert_eq!(
            waiter_rx.recv().await,
            Some(ClientEvent::ProductIds(ProductIdBatch(vec!["x".to_string()])))
        );
        assert!(other_rx.try_recv().is_err());
        assert!(!store.is_pending(&request_id));
    }

    #[tokio::test]
    async fn test_callback_with_unknown_request_id_is_dropped() {
        let (registry, store) = test_state();
        let (_id, mut rx) = registry.subscribe();

        // A stale id is acknowledged (the backend may be retrying) but
        // nobody takes delivery and nothing falls back to broadcast.
        let response = post(&registry, &store, Some("gone"), json!(["p1"])).await;

        let (status, Json(ack)) = response.expect("stale id is not a client error");
        assert_eq!(status, StatusCode::OK);
        assert!(ack.success);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_repeated_batches_are_not_deduplicated() {
        let (registry, store) = test_state();
        let (_id, mut rx) = registry.subscribe();

        post(&registry, &store, None, json!(["p1"])).await.unwrap();
        post(&registry, &store, None, json!(["p1"])).await.unwrap();

        let expected = ClientEvent::ProductIds(ProductIdBatch(vec!["p1".to_string()]));
        assert_eq!(rx.recv().await, Some(expected.clone()));
        assert_eq!(rx.recv().await, Some(expected));
    }
}
