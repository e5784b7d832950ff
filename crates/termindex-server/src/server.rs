//! HTTP server implementation using Axum.

use crate::handler::{handle_health, handle_home, handle_term_items};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use termindex_core::TermIndexApp;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    pub app: TermIndexApp,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/home", get(handle_home))
        .route("/terms/:term_id/items", get(handle_term_items))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(app: TermIndexApp, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let state = Arc::new(AppState { app });
    let router = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
