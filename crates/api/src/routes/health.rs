use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

/// Liveness plus a summary of what is loaded.
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "data_source": state.scanner.gateway_name(),
        "strategies": state.scanner.strategies().len(),
        "universes": state.scanner.universes().len(),
    }))
}
