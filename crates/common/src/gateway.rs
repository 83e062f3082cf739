use async_trait::async_trait;

use crate::{PriceSeries, Result, Ticker};

/// Abstraction over the historical price provider.
///
/// `UpstoxClient` implements this against the live API.
/// `OfflineGateway` implements this from fixtures on disk or in memory.
///
/// Implementations must return `Error::DataUnavailable` for network
/// failures, unknown symbols and empty responses. The scan orchestrator
/// applies its own per-ticker timeout around every call.
#[async_trait]
pub trait PriceDataGateway: Send + Sync {
    /// Fetch daily bars covering the last `lookback_days` calendar days.
    async fn fetch_history(&self, ticker: &Ticker, lookback_days: u32) -> Result<PriceSeries>;

    /// Short identifier used in logs and the health endpoint.
    fn name(&self) -> &str;
}
