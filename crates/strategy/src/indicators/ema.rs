use common::Result;

use super::{require_len, require_window};

/// Exponential moving average of the whole series, returning the latest value.
pub fn ema(values: &[f64], window: usize) -> Result<f64> {
    let series = ema_series(values, window)?;
    Ok(series[series.len() - 1])
}

/// EMA with smoothing factor `2 / (window + 1)`, seeded with the SMA of the
/// first `window` values. Output starts at input index `window - 1` and has
/// `values.len() - window + 1` points.
pub fn ema_series(values: &[f64], window: usize) -> Result<Vec<f64>> {
    require_window("EMA", window)?;
    require_len(values, window)?;

    let k = 2.0 / (window as f64 + 1.0);
    let seed = values[..window].iter().sum::<f64>() / window as f64;

    let mut out = Vec::with_capacity(values.len() - window + 1);
    out.push(seed);
    let mut prev = seed;
    for &price in &values[window..] {
        prev = price * k + prev * (1.0 - k);
        out.push(prev);
    }
    Ok(out)
}
