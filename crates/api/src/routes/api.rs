use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use common::ScanOutcome;
use strategy::StrategyInfo;

use super::required;
use crate::{ApiError, AppState};

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/strategies", get(list_strategies))
        .route("/api/universes", get(list_universes))
        .route("/api/scan", post(scan))
}

// ─── Catalogue ────────────────────────────────────────────────────────────────

async fn list_strategies(State(state): State<AppState>) -> Json<Vec<StrategyInfo>> {
    Json(state.scanner.strategies().list())
}

#[derive(Serialize)]
struct UniverseInfo {
    name: String,
    count: usize,
}

async fn list_universes(State(state): State<AppState>) -> Json<Vec<UniverseInfo>> {
    let universes = state
        .scanner
        .universes()
        .iter()
        .map(|u| UniverseInfo {
            name: u.name().to_string(),
            count: u.len(),
        })
        .collect();
    Json(universes)
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ScanRequest {
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    universe: Option<String>,
}

/// Blocking scan. The body is parsed as JSON regardless of content type;
/// an empty body counts as an empty request.
async fn scan(State(state): State<AppState>, body: Bytes) -> Result<Json<ScanOutcome>, ApiError> {
    let req: ScanRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ScanRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?
    };
    let strategy = required(req.strategy, "strategy")?;
    let universe = required(req.universe, "universe")?;

    info!(strategy = %strategy, universe = %universe, "Scan requested");
    let outcome = state.scanner.run_scan(&strategy, &universe).await?;
    Ok(Json(outcome.ranked()))
}
