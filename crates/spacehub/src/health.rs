//! Plain HTTP liveness endpoint for load balancers and uptime checks.

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// `GET /health` → `200 OK` with body `OK`. Every other path is a 404.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "OK"
}

/// Serves [`router`] on `listener` until the process exits.
pub(crate) async fn serve(listener: TcpListener) {
    if let Err(e) = axum::serve(listener, router()).await {
        tracing::error!(error = %e, "health endpoint stopped");
    }
}
