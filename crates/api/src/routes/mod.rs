mod api;
mod health;
mod stream;

pub use api::api_router;
pub use health::health_router;
pub use stream::stream_router;

use crate::ApiError;

/// Trimmed, non-empty request field or a 400 naming it.
fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}
