use axum::Json;
use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::protocol::{CallbackAck, CallbackRejection, REJECT_NOT_AN_ARRAY};
use crate::broadcast::registry::ConnectionRegistry;
use crate::broadcast::types::{ClientEvent, ProductIdBatch};
use crate::correlation::store::CorrelationStore;
use crate::correlation::types::RequestId;

#[derive(Deserialize)]
pub struct CallbackParams {
    pub request_id: Option<String>,
}

/// Accepts an asynchronous result payload from the search backend.
///
/// The body must be a JSON array of product-id strings; anything else is
/// rejected at the boundary with no side effects. A callback carrying a
/// `request_id` query parameter is resolved to the waiter registered for
/// that search (a stale or unknown id is dropped inside the store); an
/// id-less callback is fanned out to every connected client.
pub async fn handle_callback(
    Query(params): Query<CallbackParams>,
    Extension(registry): Extension<Arc<ConnectionRegistry>>,
    Extension(store): Extension<Arc<CorrelationStore>>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<CallbackAck>), (StatusCode, Json<CallbackRejection>)> {
    let Some(batch) = parse_batch(&payload) else {
        tracing::warn!("Rejected callback payload: not an array of product ids");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(CallbackRejection {
                error: REJECT_NOT_AN_ARRAY.to_string(),
            }),
        ));
    };

    match params.request_id {
        Some(id) => {
            store.resolve(&RequestId(id), batch);
        }
        None => {
            let delivered = registry.broadcast(&ClientEvent::ProductIds(batch));
            tracing::debug!("Broadcast product id batch to {} client(s)", delivered);
        }
    }

    Ok((StatusCode::OK, Json(CallbackAck { success: true })))
}

/// Validates the callback body shape: a JSON array of strings, nothing else.
pub fn parse_batch(payload: &Value) -> Option<ProductIdBatch> {
    let items = payload.as_array()?;

    let ids = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<String>>>()?;

    Some(ProductIdBatch(ids))
}
