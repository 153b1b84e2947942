use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use snapfront::broadcast::handlers::handle_connect;
use snapfront::broadcast::registry::ConnectionRegistry;
use snapfront::callback::handlers::handle_callback;
use snapfront::callback::protocol::{ENDPOINT_CALLBACK, ENDPOINT_EVENTS};
use snapfront::correlation::store::{CorrelationStore, DEFAULT_CALLBACK_TIMEOUT};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse()?;

    let registry = ConnectionRegistry::new();
    let store = CorrelationStore::new(DEFAULT_CALLBACK_TIMEOUT);

    let app = Router::new()
        .route(ENDPOINT_CALLBACK, post(handle_callback))
        .route(ENDPOINT_EVENTS, get(handle_connect))
        .layer(Extension(registry))
        .layer(Extension(store));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Relay server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
