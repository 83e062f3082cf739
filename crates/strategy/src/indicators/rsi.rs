use common::{Error, Result};

use super::require_len;

/// RSI (Relative Strength Index) indicator.
///
/// Uses Wilder's smoothed moving average (same as TradingView / standard RSI).
/// Needs at least `period + 1` closes.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl RsiIndicator {
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(Error::InvalidParameter("RSI period must be > 0".into()));
        }
        Ok(Self { period })
    }

    /// Bars of history needed before the first RSI value exists.
    pub fn warm_up(&self) -> usize {
        self.period + 1
    }

    /// Latest RSI from a slice of close prices (oldest first).
    pub fn compute(&self, closes: &[f64]) -> Result<f64> {
        let series = self.series(closes)?;
        Ok(series[series.len() - 1])
    }

    /// RSI for every bar from index `period` on (`closes.len() - period` points).
    pub fn series(&self, closes: &[f64]) -> Result<Vec<f64>> {
        require_len(closes, self.warm_up())?;
        let period = self.period as f64;

        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let initial = &changes[..self.period];

        // First average gain/loss over the initial `period` changes
        let mut avg_gain = initial.iter().filter(|&&c| c > 0.0).sum::<f64>() / period;
        let mut avg_loss = initial
            .iter()
            .filter(|&&c| c < 0.0)
            .map(|c| c.abs())
            .sum::<f64>()
            / period;

        let mut out = Vec::with_capacity(changes.len() - self.period + 1);
        out.push(rsi_from_averages(avg_gain, avg_loss));

        // Wilder smoothing over remaining changes
        for &change in &changes[self.period..] {
            let gain = if change > 0.0 { change } else { 0.0 };
            let loss = if change < 0.0 { change.abs() } else { 0.0 };
            avg_gain = (avg_gain * (period - 1.0) + gain) / period;
            avg_loss = (avg_loss * (period - 1.0) + loss) / period;
            out.push(rsi_from_averages(avg_gain, avg_loss));
        }
        Ok(out)
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // flat series carries no momentum either way
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_errors_when_insufficient_data() {
        let rsi = RsiIndicator::default();
        // Need at least period+1 = 15 values
        let prices = vec![100.0; 14];
        assert!(matches!(
            rsi.compute(&prices),
            Err(Error::InsufficientData {
                required: 15,
                available: 14
            })
        ));
    }

    #[test]
    fn rsi_returns_value_with_exactly_period_plus_one() {
        let rsi = RsiIndicator::default();
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert!(rsi.compute(&prices).is_ok());
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let rsi = RsiIndicator::new(3).unwrap();
        // Strictly increasing prices → RSI = 100
        let prices = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let value = rsi.compute(&prices).unwrap();
        assert!((value - 100.0).abs() < 1e-6, "Expected ~100, got {value}");
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let rsi = RsiIndicator::new(3).unwrap();
        // Strictly decreasing prices → RSI = 0
        let prices = vec![14.0, 13.0, 12.0, 11.0, 10.0];
        let value = rsi.compute(&prices).unwrap();
        assert!((value - 0.0).abs() < 1e-6, "Expected ~0, got {value}");
    }

    #[test]
    fn rsi_flat_series_is_neutral() {
        let rsi = RsiIndicator::default();
        let value = rsi.compute(&vec![250.0; 40]).unwrap();
        assert_eq!(value, 50.0);
    }

    #[test]
    fn rsi_seed_ratio_of_one_to_four_is_twenty() {
        // 2 gains of +1 and 12 losses of -2/3: avg_gain/avg_loss = 2/8 → RSI 20
        let rsi = RsiIndicator::default();
        let mut prices = vec![100.0];
        for i in 0..14 {
            let last = *prices.last().unwrap();
            let change = if i < 2 { 1.0 } else { -2.0 / 3.0 };
            prices.push(last + change);
        }
        let value = rsi.compute(&prices).unwrap();
        assert!((value - 20.0).abs() < 1e-9, "Expected 20, got {value}");
    }

    #[test]
    fn rsi_series_length_matches_warm_up() {
        let rsi = RsiIndicator::default();
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i % 4) as f64).collect();
        let series = rsi.series(&prices).unwrap();
        assert_eq!(series.len(), 30 - 14);
        assert_eq!(*series.last().unwrap(), rsi.compute(&prices).unwrap());
    }

    #[test]
    fn rsi_known_value_in_range() {
        // Prices sourced from Investopedia RSI example (rounded)
        let rsi = RsiIndicator::default();
        let prices = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.15, 43.61, 44.33, 44.83, 45.10,
            45.15, 44.34, 44.09,
        ];
        let v = rsi.compute(&prices).unwrap();
        assert!((0.0..=100.0).contains(&v), "RSI out of range: {v}");
    }
}
