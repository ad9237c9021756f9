//! Liveness endpoint for uptime monitors.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing::{error, info};

pub const ALIVE_BODY: &str = "Bot is alive!";

pub fn router() -> Router {
    Router::new().route("/", get(|| async { ALIVE_BODY }))
}

pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await
}

/// Serve until the listener fails. Failures are logged; the bot keeps running.
pub async fn serve(listener: TcpListener) {
    if let Ok(addr) = listener.local_addr() {
        info!("keep-alive server running on port {}", addr.port());
    }
    if let Err(e) = axum::serve(listener, router()).await {
        error!("keep-alive server stopped: {e}");
    }
}
