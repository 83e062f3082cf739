use serde::{Deserialize, Serialize};

use common::{format_decimal, round2, Error, MatchResult, PriceSeries, Result, Strength, Ticker};

use super::build_match;
use crate::Strategy;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakoutParams {
    /// Bars (before the last) the trailing high is taken over.
    pub high_window: usize,
    pub threshold_pct: f64,
    pub min_lookback: usize,
    pub lookback_days: u32,
}

impl Default for BreakoutParams {
    fn default() -> Self {
        Self {
            high_window: 252,
            threshold_pct: 2.0,
            min_lookback: 50,
            lookback_days: 365,
        }
    }
}

/// Last close within `threshold_pct` of the trailing high.
pub struct Breakout {
    params: BreakoutParams,
    description: String,
}

impl Breakout {
    pub const NAME: &'static str = "52-Week High Breakout";

    pub fn new(params: BreakoutParams) -> Result<Self> {
        if params.high_window == 0 {
            return Err(Error::InvalidParameter(
                "breakout high_window must be positive".into(),
            ));
        }
        Ok(Self {
            description: format!(
                "Stocks trading within {}% of their {}-session high: momentum breakout candidates.",
                params.threshold_pct, params.high_window
            ),
            params,
        })
    }
}

impl Strategy for Breakout {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn min_lookback(&self) -> usize {
        // at least one prior bar to take a high over
        self.params.min_lookback.max(2)
    }

    fn lookback_days(&self) -> u32 {
        self.params.lookback_days
    }

    fn evaluate(&self, ticker: &Ticker, series: &PriceSeries) -> Result<Option<MatchResult>> {
        if series.len() < self.min_lookback() {
            return Ok(None);
        }

        let bars = series.bars();
        let (last, prior) = match bars.split_last() {
            Some(split) => split,
            None => return Ok(None),
        };
        let start = prior.len().saturating_sub(self.params.high_window);
        let high = prior[start..]
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);
        if high <= 0.0 {
            return Err(Error::MalformedSeries(format!(
                "{ticker}: non-positive trailing high {high}"
            )));
        }

        let price = last.close;
        let dist = round2((high - price) / high * 100.0);
        if dist > self.params.threshold_pct {
            return Ok(None);
        }

        let dist = format_decimal(dist);
        Ok(Some(build_match(
            ticker,
            series,
            format!("Near 52W High ({dist}% away)"),
            Strength::strong_if(price >= high),
            "Dist. from High",
            format!("{dist}%"),
        )))
    }
}
