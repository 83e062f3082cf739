use serde::{Deserialize, Serialize};

use common::{format_decimal, round2, Error, MatchResult, PriceSeries, Result, Strength, Ticker};

use super::build_match;
use crate::indicators::sma;
use crate::Strategy;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeSurgeParams {
    pub avg_window: usize,
    pub volume_multiple: f64,
    pub strong_multiple: f64,
    /// Minimum absolute last-bar price change, in percent.
    pub min_change_pct: f64,
    pub min_lookback: usize,
    pub lookback_days: u32,
}

impl Default for VolumeSurgeParams {
    fn default() -> Self {
        Self {
            avg_window: 20,
            volume_multiple: 3.0,
            strong_multiple: 5.0,
            min_change_pct: 1.5,
            min_lookback: 25,
            lookback_days: 180,
        }
    }
}

/// Unusual volume on a meaningful price move.
pub struct VolumeSurge {
    params: VolumeSurgeParams,
    description: String,
}

impl VolumeSurge {
    pub const NAME: &'static str = "Volume Surge";

    pub fn new(params: VolumeSurgeParams) -> Result<Self> {
        if params.avg_window == 0 {
            return Err(Error::InvalidParameter(
                "volume surge avg_window must be positive".into(),
            ));
        }
        Ok(Self {
            description: format!(
                "Stocks with {}× or more their {}-day average volume and a {}%+ price move: \
                 institutional activity.",
                params.volume_multiple, params.avg_window, params.min_change_pct
            ),
            params,
        })
    }
}

impl Strategy for VolumeSurge {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn min_lookback(&self) -> usize {
        self.params.min_lookback.max(self.params.avg_window + 1)
    }

    fn lookback_days(&self) -> u32 {
        self.params.lookback_days
    }

    fn evaluate(&self, ticker: &Ticker, series: &PriceSeries) -> Result<Option<MatchResult>> {
        if series.len() < self.min_lookback() {
            return Ok(None);
        }

        let volumes = series.volumes();
        let Some((&current, prior)) = volumes.split_last() else {
            return Ok(None);
        };
        let average = sma(prior, self.params.avg_window)?;
        let ratio = if average > 0.0 {
            round2(current / average)
        } else {
            0.0
        };
        let Some(change) = series.change_pct() else {
            return Ok(None);
        };

        if ratio < self.params.volume_multiple || change.abs() < self.params.min_change_pct {
            return Ok(None);
        }

        let direction = if change > 0.0 { "Bullish" } else { "Bearish" };
        let ratio_text = format_decimal(ratio);
        Ok(Some(build_match(
            ticker,
            series,
            format!("{direction} Volume Surge ({ratio_text}× avg)"),
            Strength::strong_if(ratio >= self.params.strong_multiple),
            "Vol Ratio",
            format!("{ratio_text}×"),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::series_from;

    fn evaluate(last_close: f64, last_volume: f64) -> Option<MatchResult> {
        let mut closes = vec![100.0; 29];
        closes.push(last_close);
        let mut volumes = vec![1_000.0; 29];
        volumes.push(last_volume);
        VolumeSurge::new(VolumeSurgeParams::default())
            .unwrap()
            .evaluate(&Ticker::new("TATASTEEL.NS"), &series_from(&closes, &volumes))
            .unwrap()
    }

    #[test]
    fn surge_on_rally_is_bullish() {
        let m = evaluate(103.0, 3_500.0).expect("3.5× volume on +3%");
        assert_eq!(m.signal, "Bullish Volume Surge (3.5× avg)");
        assert_eq!(m.metric_value, "3.5×");
        assert_eq!(m.strength, Strength::Moderate);
        assert_eq!(m.change_pct, 3.0);
    }

    #[test]
    fn surge_on_selloff_is_bearish_and_strong() {
        let m = evaluate(97.0, 6_000.0).expect("6× volume on -3%");
        assert!(m.signal.starts_with("Bearish"));
        assert_eq!(m.strength, Strength::Strong);
    }

    #[test]
    fn small_price_move_is_ignored() {
        assert!(evaluate(101.0, 10_000.0).is_none());
    }

    #[test]
    fn ordinary_volume_is_ignored() {
        assert!(evaluate(105.0, 2_000.0).is_none());
    }

    #[test]
    fn zero_average_volume_never_matches() {
        let mut closes = vec![100.0; 29];
        closes.push(110.0);
        let mut volumes = vec![0.0; 29];
        volumes.push(5_000.0);
        let strategy = VolumeSurge::new(VolumeSurgeParams::default()).unwrap();
        assert!(strategy
            .evaluate(&Ticker::new("X"), &series_from(&closes, &volumes))
            .unwrap()
            .is_none());
    }
}
