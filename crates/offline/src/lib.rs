use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Duration;
use tracing::{debug, info, warn};

use common::{Bar, Error, PriceDataGateway, PriceSeries, Result, Ticker};

/// Price gateway backed by fixtures instead of a live provider.
///
/// Series are keyed by bare symbol, so `"SBIN"` and `"SBIN.NS"` are the same
/// entry. No network access is ever made.
#[derive(Debug, Clone, Default)]
pub struct OfflineGateway {
    series: HashMap<String, PriceSeries>,
    /// Symbols that always fail, with the reason reported.
    failures: HashMap<String, String>,
}

impl OfflineGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, listing: &str, series: PriceSeries) -> Self {
        self.insert_series(listing, series);
        self
    }

    pub fn with_failure(mut self, listing: &str, reason: impl Into<String>) -> Self {
        self.failures.insert(key(listing), reason.into());
        self
    }

    pub fn insert_series(&mut self, listing: &str, series: PriceSeries) {
        self.series.insert(key(listing), series);
    }

    /// Load every `<SYMBOL>.json` file in `dir`. Each file holds an array of
    /// bars in any order.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            Error::Config(format!("cannot read offline data dir '{}': {e}", dir.display()))
        })?;

        let mut gateway = Self::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(symbol) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = std::fs::read_to_string(&path)?;
            let bars: Vec<Bar> = serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("bad offline series '{}': {e}", path.display()))
            })?;
            let series = PriceSeries::from_unsorted(bars).map_err(|e| {
                Error::Config(format!("bad offline series '{}': {e}", path.display()))
            })?;
            debug!(symbol, bars = series.len(), "Loaded offline series");
            gateway.insert_series(symbol, series);
        }

        if gateway.series.is_empty() {
            warn!(dir = %dir.display(), "Offline data dir has no series");
        }
        info!(dir = %dir.display(), symbols = gateway.len(), "Offline gateway ready");
        Ok(gateway)
    }

    /// Number of symbols with a stored series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

fn key(listing: &str) -> String {
    Ticker::new(listing).symbol().to_string()
}

/// Keep the bars within `lookback_days` calendar days of the last bar.
fn clip(series: &PriceSeries, lookback_days: u32) -> Result<PriceSeries> {
    let Some(last) = series.last() else {
        return Ok(series.clone());
    };
    let cutoff = last.timestamp - Duration::days(i64::from(lookback_days));
    let start = series.bars().partition_point(|b| b.timestamp < cutoff);
    if start == 0 {
        return Ok(series.clone());
    }
    PriceSeries::new(series.bars()[start..].to_vec())
}

#[async_trait]
impl PriceDataGateway for OfflineGateway {
    async fn fetch_history(&self, ticker: &Ticker, lookback_days: u32) -> Result<PriceSeries> {
        if let Some(reason) = self.failures.get(ticker.symbol()) {
            return Err(Error::data_unavailable(ticker.symbol(), reason.clone()));
        }
        let series = self
            .series
            .get(ticker.symbol())
            .ok_or_else(|| Error::data_unavailable(ticker.symbol(), "no offline series"))?;
        if series.is_empty() {
            return Err(Error::data_unavailable(ticker.symbol(), "empty offline series"));
        }
        clip(series, lookback_days)
    }

    fn name(&self) -> &str {
        "offline"
    }
}
