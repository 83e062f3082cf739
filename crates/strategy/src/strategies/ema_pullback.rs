use serde::{Deserialize, Serialize};

use common::{round2, Error, MatchResult, PriceSeries, Result, Strength, Ticker};

use super::build_match;
use crate::indicators::ema;
use crate::Strategy;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmaPullbackParams {
    pub fast: usize,
    pub slow: usize,
    /// Band around the fast EMA, in percent: `[-tolerance, 2 * tolerance]`.
    pub tolerance_pct: f64,
    pub strong_pct: f64,
    pub min_lookback: usize,
    pub lookback_days: u32,
}

impl Default for EmaPullbackParams {
    fn default() -> Self {
        Self {
            fast: 20,
            slow: 50,
            tolerance_pct: 1.5,
            strong_pct: 0.5,
            min_lookback: 55,
            lookback_days: 180,
        }
    }
}

/// Uptrending stock dipping back to its fast EMA.
pub struct EmaPullback {
    params: EmaPullbackParams,
    metric_label: String,
    description: String,
}

impl EmaPullback {
    pub const NAME: &'static str = "EMA Pullback (Trend Dip)";

    pub fn new(params: EmaPullbackParams) -> Result<Self> {
        if params.fast == 0 || params.fast >= params.slow {
            return Err(Error::InvalidParameter(format!(
                "EMA pullback fast EMA ({}) must be > 0 and below slow EMA ({})",
                params.fast, params.slow
            )));
        }
        Ok(Self {
            metric_label: format!("Δ EMA{}", params.fast),
            description: format!(
                "Stocks in an uptrend (above {} EMA) pulling back to the {} EMA: \
                 buy-the-dip setup.",
                params.slow, params.fast
            ),
            params,
        })
    }
}

impl Strategy for EmaPullback {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn min_lookback(&self) -> usize {
        self.params.min_lookback.max(self.params.slow)
    }

    fn lookback_days(&self) -> u32 {
        self.params.lookback_days
    }

    fn evaluate(&self, ticker: &Ticker, series: &PriceSeries) -> Result<Option<MatchResult>> {
        if series.len() < self.min_lookback() {
            return Ok(None);
        }

        let closes = series.closes();
        let price = closes[closes.len() - 1];
        let fast = ema(&closes, self.params.fast)?;
        let slow = ema(&closes, self.params.slow)?;

        let in_uptrend = price > slow && fast > slow;
        let dist = round2((price - fast) / fast * 100.0);
        let tol = self.params.tolerance_pct;
        if !in_uptrend || dist < -tol || dist > 2.0 * tol {
            return Ok(None);
        }

        Ok(Some(build_match(
            ticker,
            series,
            format!("EMA{} Pullback ({dist:+.1}%)", self.params.fast),
            Strength::strong_if(dist.abs() < self.params.strong_pct),
            &self.metric_label,
            format!("{dist:+.1}%"),
        )))
    }
}
