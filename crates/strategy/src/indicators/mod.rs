//! Pure indicator functions over price columns (oldest value first).
//!
//! Every indicator has a latest-value form and a series form. Series are
//! tail-aligned: the last output corresponds to the last input, and the
//! output is shorter than the input by the indicator's warm-up.

pub mod crossover;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use crossover::crossed_above_within;
pub use ema::{ema, ema_series};
pub use macd::{MacdIndicator, MacdSeries};
pub use rsi::RsiIndicator;
pub use sma::{sma, sma_series};

use common::{Error, Result};

pub(crate) fn require_len(values: &[f64], required: usize) -> Result<()> {
    if values.len() < required {
        return Err(Error::InsufficientData {
            required,
            available: values.len(),
        });
    }
    Ok(())
}

pub(crate) fn require_window(name: &str, window: usize) -> Result<()> {
    if window == 0 {
        return Err(Error::InvalidParameter(format!("{name} window must be > 0")));
    }
    Ok(())
}
