use common::Result;

use super::{require_len, require_window};

/// Simple moving average of the last `window` values.
pub fn sma(values: &[f64], window: usize) -> Result<f64> {
    require_window("SMA", window)?;
    require_len(values, window)?;
    Ok(mean(&values[values.len() - window..]))
}

/// Rolling SMA. Output has `values.len() - window + 1` points.
pub fn sma_series(values: &[f64], window: usize) -> Result<Vec<f64>> {
    require_window("SMA", window)?;
    require_len(values, window)?;
    Ok(values.windows(window).map(mean).collect())
}

fn mean(slice: &[f64]) -> f64 {
    slice.iter().sum::<f64>() / slice.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Error;

    #[test]
    fn sma_of_trailing_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((sma(&values, 2).unwrap() - 4.5).abs() < 1e-12);
        assert!((sma(&values, 5).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn sma_series_is_tail_aligned() {
        let values = [2.0, 4.0, 6.0, 8.0];
        assert_eq!(sma_series(&values, 3).unwrap(), vec![4.0, 6.0]);
    }

    #[test]
    fn sma_rejects_short_series() {
        let err = sma(&[1.0, 2.0], 3).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData {
                required: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn sma_rejects_zero_window() {
        assert!(matches!(sma(&[1.0], 0), Err(Error::InvalidParameter(_))));
    }
}
