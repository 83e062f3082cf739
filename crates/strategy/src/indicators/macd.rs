use common::{Error, Result};

use super::{ema_series, require_len};

/// MACD (Moving Average Convergence/Divergence) indicator.
///
/// Computes: MACD line = EMA(fast) − EMA(slow), Signal = EMA(macd_line, signal_period).
#[derive(Debug, Clone)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// MACD and signal lines, both tail-aligned with the input closes.
///
/// `macd` starts at the bar where the slow EMA is first defined, so it is
/// `signal - 1` points longer than `signal_line`.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal_line: Vec<f64>,
}

impl MacdSeries {
    pub fn latest_macd(&self) -> f64 {
        self.macd[self.macd.len() - 1]
    }

    pub fn latest_signal(&self) -> f64 {
        self.signal_line[self.signal_line.len() - 1]
    }

    /// MACD minus signal on the last bar.
    pub fn histogram(&self) -> f64 {
        self.latest_macd() - self.latest_signal()
    }
}

impl Default for MacdIndicator {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self> {
        if fast == 0 || signal == 0 {
            return Err(Error::InvalidParameter(
                "MACD periods must be > 0".to_string(),
            ));
        }
        if fast >= slow {
            return Err(Error::InvalidParameter(format!(
                "MACD fast period ({fast}) must be less than slow period ({slow})"
            )));
        }
        Ok(Self { fast, slow, signal })
    }

    /// Closes needed before the first signal-line value exists.
    pub fn warm_up(&self) -> usize {
        self.slow + self.signal - 1
    }

    /// Compute both lines from a slice of close prices (oldest first).
    pub fn compute(&self, closes: &[f64]) -> Result<MacdSeries> {
        require_len(closes, self.warm_up())?;

        let fast_ema = ema_series(closes, self.fast)?;
        let slow_ema = ema_series(closes, self.slow)?;

        // fast EMA starts `slow - fast` bars earlier than the slow EMA
        let offset = self.slow - self.fast;
        let macd: Vec<f64> = slow_ema
            .iter()
            .enumerate()
            .map(|(i, slow)| fast_ema[i + offset] - slow)
            .collect();

        let signal_line = ema_series(&macd, self.signal)?;
        Ok(MacdSeries { macd, signal_line })
    }
}
