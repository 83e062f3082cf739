use serde::{Deserialize, Serialize};

use common::{MatchResult, PriceSeries, Result, Strength, Ticker};

use super::build_match;
use crate::indicators::{crossed_above_within, MacdIndicator};
use crate::Strategy;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacdCrossoverParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    /// Number of most recent bars in which a crossover counts.
    pub crossover_window: usize,
    pub min_lookback: usize,
    pub lookback_days: u32,
}

impl Default for MacdCrossoverParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
            crossover_window: 3,
            min_lookback: 40,
            lookback_days: 180,
        }
    }
}

/// MACD line crossed above its signal line within the last few sessions.
pub struct MacdCrossover {
    params: MacdCrossoverParams,
    indicator: MacdIndicator,
    description: String,
    min_lookback: usize,
}

impl MacdCrossover {
    pub const NAME: &'static str = "MACD Bullish Crossover";

    pub fn new(params: MacdCrossoverParams) -> Result<Self> {
        let indicator = MacdIndicator::new(params.fast, params.slow, params.signal)?;
        // one extra signal point per bar of the window, plus the bar before it
        let needed = indicator.warm_up() + params.crossover_window;
        Ok(Self {
            min_lookback: params.min_lookback.max(needed),
            description: format!(
                "Stocks where the MACD({},{},{}) line crossed above its Signal line \
                 in the last {} sessions.",
                params.fast, params.slow, params.signal, params.crossover_window
            ),
            indicator,
            params,
        })
    }
}

impl Strategy for MacdCrossover {
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

        let macd = self.indicator.compute(&series.closes())?;
        let Some(bars_ago) =
            crossed_above_within(&macd.macd, &macd.signal_line, self.params.crossover_window)
        else {
            return Ok(None);
        };

        let histogram = macd.histogram();
        Ok(Some(build_match(
            ticker,
            series,
            "MACD Bullish Crossover".to_string(),
            Strength::strong_if(bars_ago == 0),
            "Histogram",
            format!("{histogram:+.3}"),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::series_from_closes;

    /// Shortened MACD so that a 30-bar series is enough history.
    fn short_params(crossover_window: usize) -> MacdCrossoverParams {
        MacdCrossoverParams {
            fast: 6,
            slow: 13,
            signal: 5,
            crossover_window,
            min_lookback: 20,
            lookback_days: 180,
        }
    }

    /// `flat` bars at 100, nine one-point declines, then a spike to 200.
    /// The decline keeps MACD strictly below its signal line; the spike
    /// lifts MACD above it on the spike bar.
    fn decline_then_spike(flat: usize) -> Vec<f64> {
        let mut closes = vec![100.0; flat];
        closes.extend((1..=9).map(|i| 100.0 - i as f64));
        closes.push(200.0);
        closes
    }

    #[test]
    fn crossover_on_last_bar_is_strong() {
        let closes = decline_then_spike(20);
        assert_eq!(closes.len(), 30);
        let m = MacdCrossover::new(short_params(3))
            .unwrap()
            .evaluate(&Ticker::new("ITC.NS"), &series_from_closes(&closes))
            .unwrap()
            .expect("spike crosses MACD above signal");
        assert_eq!(m.strength, Strength::Strong);
        assert_eq!(m.signal, "MACD Bullish Crossover");
        assert!(m.metric_value.starts_with('+'));
    }

    #[test]
    fn crossover_four_bars_back_is_outside_window() {
        // same crossover, followed by four collapsing bars that keep MACD falling
        let mut closes = decline_then_spike(16);
        closes.extend([10.0, 9.0, 8.0, 7.0]);
        assert_eq!(closes.len(), 30);
        let series = series_from_closes(&closes);

        let three = MacdCrossover::new(short_params(3)).unwrap();
        assert!(three
            .evaluate(&Ticker::new("ITC.NS"), &series)
            .unwrap()
            .is_none());

        let five = MacdCrossover::new(short_params(5)).unwrap();
        let m = five
            .evaluate(&Ticker::new("ITC.NS"), &series)
            .unwrap()
            .expect("crossover 4 bars ago is inside a 5-bar window");
        assert_eq!(m.strength, Strength::Moderate);
    }

    #[test]
    fn default_lookback_covers_warm_up() {
        let strategy = MacdCrossover::new(MacdCrossoverParams::default()).unwrap();
        assert_eq!(strategy.min_lookback(), 40);
        let series = series_from_closes(&vec![100.0; 39]);
        assert!(strategy
            .evaluate(&Ticker::new("X"), &series)
            .unwrap()
            .is_none());
    }

    #[test]
    fn sustained_decline_has_no_bullish_cross() {
        let mut closes = vec![100.0; 40];
        closes.extend((1..=40).map(|i| 100.0 - i as f64));
        let strategy = MacdCrossover::new(MacdCrossoverParams::default()).unwrap();
        assert!(strategy
            .evaluate(&Ticker::new("X"), &series_from_closes(&closes))
            .unwrap()
            .is_none());
    }
}
