use serde::{Deserialize, Serialize};

use common::{MatchResult, PriceSeries, Result, Strength, Ticker};

use super::build_match;
use crate::indicators::RsiIndicator;
use crate::Strategy;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RsiOversoldParams {
    pub period: usize,
    /// Match when RSI is strictly below this.
    pub threshold: f64,
    /// Strong when RSI is strictly below this.
    pub strong_below: f64,
    pub min_lookback: usize,
    pub lookback_days: u32,
}

impl Default for RsiOversoldParams {
    fn default() -> Self {
        Self {
            period: 14,
            threshold: 35.0,
            strong_below: 25.0,
            min_lookback: 20,
            lookback_days: 180,
        }
    }
}

/// RSI has dropped into oversold territory: a mean-reversion bounce candidate.
pub struct RsiOversold {
    params: RsiOversoldParams,
    indicator: RsiIndicator,
    metric_label: String,
    description: String,
    min_lookback: usize,
}

impl RsiOversold {
    pub const NAME: &'static str = "RSI Oversold";

    pub fn new(params: RsiOversoldParams) -> Result<Self> {
        let indicator = RsiIndicator::new(params.period)?;
        Ok(Self {
            metric_label: format!("RSI({})", params.period),
            description: format!(
                "Stocks where RSI({}) has dropped below {}: oversold, potential bounce candidates.",
                params.period, params.threshold
            ),
            min_lookback: params.min_lookback.max(indicator.warm_up()),
            indicator,
            params,
        })
    }
}

impl Strategy for RsiOversold {
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

        let rsi = self.indicator.compute(&series.closes())?;
        if rsi >= self.params.threshold {
            return Ok(None);
        }

        Ok(Some(build_match(
            ticker,
            series,
            format!("RSI Oversold @ {rsi:.1}"),
            Strength::strong_if(rsi < self.params.strong_below),
            &self.metric_label,
            format!("{rsi:.1}"),
        )))
    }
}
