use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Extension, Query};
use axum::response::IntoResponse;
use serde::Deserialize;
use std::sync::Arc;

use super::registry::ConnectionRegistry;
use crate::correlation::store::CorrelationStore;
use crate::correlation::types::RequestId;

#[derive(Deserialize)]
pub struct ConnectParams {
    pub request_id: Option<String>,
}

/// Upgrades the realtime event channel.
///
/// A client that announces a `request_id` becomes the targeted recipient for
/// that search's callback; all clients receive id-less broadcasts.
pub async fn handle_connect(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    Extension(registry): Extension<Arc<ConnectionRegistry>>,
    Extension(store): Extension<Arc<CorrelationStore>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| client_session(socket, params, registry, store))
}

/// Pumps one connection: queued events out, lifecycle frames in.
///
/// The session ends when the client disconnects, the socket errors, or the
/// registry evicted the connection for queue overflow.
async fn client_session(
    mut socket: WebSocket,
    params: ConnectParams,
    registry: Arc<ConnectionRegistry>,
    store: Arc<CorrelationStore>,
) {
    let (conn_id, mut events) = registry.subscribe();

    if let Some(request_id) = params.request_id {
        if let Some(sink) = registry.sender(&conn_id) {
            let _handle = store.register(RequestId(request_id), sink);
        }
    }

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else { break };

                let payload = match serde_json::to_string(&event) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::error!("Failed to serialize client event: {}", e);
                        continue;
                    }
                };

                if socket.send(Message::Text(payload)).await.is_err() {
                    tracing::debug!("Client {} went away mid-send", conn_id.0);
                    break;
                }
            }

            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    // Clients only listen on this channel.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("Client {} socket error: {}", conn_id.0, e);
                        break;
                    }
                }
            }
        }

        if !registry.is_connected(&conn_id) {
            break;
        }
    }

    registry.unsubscribe(&conn_id);
}
