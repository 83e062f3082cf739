mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use engine::Scanner;

pub use error::ApiError;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<Scanner>,
}

/// Assemble the full router with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::api_router())
        .merge(routes::stream_router())
        .merge(routes::health_router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and run the HTTP server until it fails.
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Screener API listening");
    axum::serve(listener, app).await
}
