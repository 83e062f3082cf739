use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Exchange suffixes stripped from universe entries before asking the gateway.
const EXCHANGE_SUFFIXES: [&str; 2] = [".NS", ".BO"];

/// One daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Bars for one ticker, strictly ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Wrap bars that are already in order. Rejects out-of-order or duplicate
    /// timestamps and non-finite prices.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(Error::MalformedSeries(format!(
                    "timestamps not strictly ascending at {}",
                    pair[1].timestamp
                )));
            }
        }
        if let Some(bad) = bars.iter().find(|b| !bar_is_finite(b)) {
            return Err(Error::MalformedSeries(format!(
                "non-finite value in bar at {}",
                bad.timestamp
            )));
        }
        Ok(Self { bars })
    }

    /// Sort by timestamp and drop duplicate timestamps (the later row wins),
    /// then validate. Providers return candles newest-first.
    pub fn from_unsorted(mut bars: Vec<Bar>) -> Result<Self> {
        bars.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self::new(deduped)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Percent change of the last close against the previous close, 2dp.
    pub fn change_pct(&self) -> Option<f64> {
        let n = self.bars.len();
        if n < 2 {
            return None;
        }
        let prev = self.bars[n - 2].close;
        if prev == 0.0 {
            return None;
        }
        Some(round2((self.bars[n - 1].close - prev) / prev * 100.0))
    }
}

fn bar_is_finite(bar: &Bar) -> bool {
    [bar.open, bar.high, bar.low, bar.close, bar.volume]
        .iter()
        .all(|v| v.is_finite())
}

/// A universe entry. `listing` is the symbol as configured (e.g. "RELIANCE.NS"),
/// `symbol` is the bare exchange symbol sent to the data provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker {
    symbol: String,
    listing: String,
}

impl Ticker {
    pub fn new(listing: impl Into<String>) -> Self {
        let listing = listing.into().trim().to_string();
        let symbol = EXCHANGE_SUFFIXES
            .iter()
            .find_map(|suffix| listing.strip_suffix(suffix))
            .unwrap_or(&listing)
            .to_string();
        Self { symbol, listing }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn listing(&self) -> &str {
        &self.listing
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.listing)
    }
}

/// Qualitative strength of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    Strong,
    Moderate,
}

impl Strength {
    pub fn strong_if(condition: bool) -> Self {
        if condition {
            Strength::Strong
        } else {
            Strength::Moderate
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Strong => write!(f, "Strong"),
            Strength::Moderate => write!(f, "Moderate"),
        }
    }
}

/// A ticker that satisfied a strategy predicate.
///
/// Field names are part of the public JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub ticker: String,
    pub full_ticker: String,
    pub price: f64,
    pub change_pct: f64,
    pub signal: String,
    pub strength: Strength,
    pub metric_label: String,
    pub metric_value: String,
}

/// A ticker that could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerFailure {
    pub ticker: String,
    pub reason: String,
}

/// Aggregate result of one scan request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutcome {
    pub strategy: String,
    pub universe: String,
    /// Tickers whose history was retrieved and evaluated.
    pub total_scanned: usize,
    pub matches: usize,
    pub results: Vec<MatchResult>,
    #[serde(skip)]
    pub failures: Vec<TickerFailure>,
}

impl ScanOutcome {
    /// Reorder results for display: Strong first, then largest absolute move.
    pub fn ranked(mut self) -> Self {
        self.results.sort_by(|a, b| {
            let strength = |r: &MatchResult| match r.strength {
                Strength::Strong => 0,
                Strength::Moderate => 1,
            };
            match strength(a).cmp(&strength(b)) {
                Ordering::Equal => b.change_pct.abs().total_cmp(&a.change_pct.abs()),
                other => other,
            }
        });
        self
    }
}

/// Incremental progress of a streamed scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScanEvent {
    Progress {
        completed: usize,
        total: usize,
        symbol: String,
    },
    Match {
        completed: usize,
        total: usize,
        #[serde(flatten)]
        result: MatchResult,
    },
    Done {
        total_scanned: usize,
        matches: usize,
    },
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shortest decimal form of `value` that keeps at least one fractional
/// digit: `3.5`, `1.0`, `-2.02`.
pub fn format_decimal(value: f64) -> String {
    // normalizes -0.0
    let value = value + 0.0;
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}
