//! The built-in detection rules. Each strategy owns its parameters; every
//! window and tolerance has a default and can be overridden from the
//! strategy config file.

pub mod breakout;
pub mod ema_pullback;
pub mod golden_cross;
pub mod macd_crossover;
pub mod rsi_oversold;
pub mod volume_surge;

pub use breakout::{Breakout, BreakoutParams};
pub use ema_pullback::{EmaPullback, EmaPullbackParams};
pub use golden_cross::{GoldenCross, GoldenCrossParams};
pub use macd_crossover::{MacdCrossover, MacdCrossoverParams};
pub use rsi_oversold::{RsiOversold, RsiOversoldParams};
pub use volume_surge::{VolumeSurge, VolumeSurgeParams};

use common::{round2, MatchResult, PriceSeries, Strength, Ticker};

/// Assemble a match for the last bar of `series`.
pub(crate) fn build_match(
    ticker: &Ticker,
    series: &PriceSeries,
    signal: String,
    strength: Strength,
    metric_label: &str,
    metric_value: String,
) -> MatchResult {
    MatchResult {
        ticker: ticker.symbol().to_string(),
        full_ticker: ticker.listing().to_string(),
        price: round2(series.last().map(|b| b.close).unwrap_or_default()),
        change_pct: series.change_pct().unwrap_or_default(),
        signal,
        strength,
        metric_label: metric_label.to_string(),
        metric_value,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};
    use common::{Bar, PriceSeries};

    /// Daily series from closes; volume constant, high/low equal to close.
    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        series_from(closes, &vec![1_000.0; closes.len()])
    }

    pub fn series_from(closes: &[f64], volumes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }
}
