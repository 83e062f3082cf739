use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Router,
};
use futures_util::stream;
use serde::Deserialize;
use tracing::{info, warn};

use super::required;
use crate::{ApiError, AppState};

pub fn stream_router() -> Router<AppState> {
    Router::new().route("/api/scan/stream", get(scan_stream))
}

#[derive(Debug, Deserialize)]
struct ScanQuery {
    strategy: Option<String>,
    universe: Option<String>,
}

/// Server-sent events: one `progress` or `match` event per ticker as it
/// completes, then `done`. Closing the connection cancels the scan.
async fn scan_stream(
    State(state): State<AppState>,
    Query(q): Query<ScanQuery>,
) -> Result<Response, ApiError> {
    let strategy = required(q.strategy, "strategy")?;
    let universe = required(q.universe, "universe")?;

    info!(strategy = %strategy, universe = %universe, "Streaming scan requested");
    let rx = state.scanner.scan_stream(&strategy, &universe)?;

    let events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let sse = Event::default().json_data(&event).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to encode scan event");
            Event::default().comment("encode error")
        });
        Some((Ok::<_, Infallible>(sse), rx))
    });

    let headers = [("x-accel-buffering", "no")];
    Ok((headers, Sse::new(events).keep_alive(KeepAlive::default())).into_response())
}
