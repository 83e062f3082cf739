use serde::{Deserialize, Serialize};

use common::{format_decimal, round2, Error, MatchResult, PriceSeries, Result, Strength, Ticker};

use super::build_match;
use crate::indicators::{crossed_above_within, sma_series};
use crate::Strategy;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoldenCrossParams {
    pub fast: usize,
    pub slow: usize,
    pub crossover_window: usize,
    pub min_lookback: usize,
    pub lookback_days: u32,
}

impl Default for GoldenCrossParams {
    fn default() -> Self {
        Self {
            fast: 50,
            slow: 200,
            crossover_window: 5,
            min_lookback: 205,
            lookback_days: 365,
        }
    }
}

/// Fast SMA crossed above the slow SMA: the classic long-term bull signal.
pub struct GoldenCross {
    params: GoldenCrossParams,
    metric_label: String,
    description: String,
    min_lookback: usize,
}

impl GoldenCross {
    pub const NAME: &'static str = "Golden Cross (50/200 SMA)";

    pub fn new(params: GoldenCrossParams) -> Result<Self> {
        if params.fast == 0 || params.fast >= params.slow {
            return Err(Error::InvalidParameter(format!(
                "golden cross fast SMA ({}) must be > 0 and below slow SMA ({})",
                params.fast, params.slow
            )));
        }
        Ok(Self {
            metric_label: format!("SMA{}/{} Gap", params.fast, params.slow),
            description: format!(
                "Stocks where the {}-day SMA crossed above the {}-day SMA in the last {} \
                 sessions: classic long-term bull signal.",
                params.fast, params.slow, params.crossover_window
            ),
            min_lookback: params.min_lookback.max(params.slow + params.crossover_window),
            params,
        })
    }
}

impl Strategy for GoldenCross {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn min_lookback(&self) -> usize {
        self.min_lookback
    }

    fn lookback_days(&self) -> u32 {
        self.params.lookback_days
    }

    fn evaluate(&self, ticker: &Ticker, series: &PriceSeries) -> Result<Option<MatchResult>> {
        if series.len() < self.min_lookback {
            return Ok(None);
        }

        let closes = series.closes();
        let fast = sma_series(&closes, self.params.fast)?;
        let slow = sma_series(&closes, self.params.slow)?;
        let Some(bars_ago) = crossed_above_within(&fast, &slow, self.params.crossover_window)
        else {
            return Ok(None);
        };

        // gap measured on the crossing bar
        let fast_at = fast[fast.len() - 1 - bars_ago];
        let slow_at = slow[slow.len() - 1 - bars_ago];
        let gap = round2((fast_at - slow_at) / slow_at * 100.0);

        Ok(Some(build_match(
            ticker,
            series,
            "Golden Cross".to_string(),
            Strength::strong_if(bars_ago == 0),
            &self.metric_label,
            format!("+{}%", format_decimal(gap)),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::series_from_closes;

    fn small() -> GoldenCross {
        GoldenCross::new(GoldenCrossParams {
            fast: 2,
            slow: 4,
            crossover_window: 3,
            min_lookback: 6,
            lookback_days: 365,
        })
        .unwrap()
    }

    #[test]
    fn cross_on_last_bar_is_strong() {
        // SMA2 goes 8 → 14 while SMA4 goes 9 → 11.5
        let closes = [10.0, 10.0, 10.0, 10.0, 8.0, 8.0, 20.0];
        let m = small()
            .evaluate(&Ticker::new("LT.NS"), &series_from_closes(&closes))
            .unwrap()
            .expect("fast SMA crosses above slow SMA on the last bar");
        assert_eq!(m.strength, Strength::Strong);
        assert_eq!(m.signal, "Golden Cross");
        assert_eq!(m.metric_label, "SMA2/4 Gap");
        assert_eq!(m.metric_value, "+21.74%");
    }

    #[test]
    fn earlier_cross_inside_window_is_moderate() {
        let mut closes = vec![10.0, 10.0, 10.0, 10.0, 8.0, 8.0, 20.0];
        closes.extend([20.0, 20.0]);
        let m = small()
            .evaluate(&Ticker::new("LT.NS"), &series_from_closes(&closes))
            .unwrap()
            .expect("cross 2 bars ago is inside a 3-bar window");
        assert_eq!(m.strength, Strength::Moderate);
        // gap is taken on the crossing bar, not the last one
        assert_eq!(m.metric_value, "+21.74%");
    }

    #[test]
    fn default_needs_205_bars() {
        let strategy = GoldenCross::new(GoldenCrossParams::default()).unwrap();
        assert_eq!(strategy.min_lookback(), 205);
        let closes: Vec<f64> = (0..204).map(|i| 100.0 + i as f64).collect();
        assert!(strategy
            .evaluate(&Ticker::new("X"), &series_from_closes(&closes))
            .unwrap()
            .is_none());
    }

    #[test]
    fn rejects_inverted_periods() {
        let params = GoldenCrossParams {
            fast: 200,
            slow: 50,
            ..Default::default()
        };
        assert!(GoldenCross::new(params).is_err());
    }
}
