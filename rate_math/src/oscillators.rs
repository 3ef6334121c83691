//! Oscillator indicator implementations
//!
//! Contains the Relative Strength Index (RSI) in the plain average-gain /
//! average-loss form over a sliding window of price changes.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Smallest average loss used as the RSI denominator
pub const LOSS_FLOOR: f64 = 0.001;

/// Relative Strength Index (RSI) implementation
#[derive(Debug, Clone)]
pub struct RelativeStrengthIndex {
    period: usize,
    previous_price: Option<f64>,
    gains: VecDeque<f64>,
    losses: VecDeque<f64>,
}

impl RelativeStrengthIndex {
    /// Create a new RSI with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            previous_price: None,
            gains: VecDeque::with_capacity(period),
            losses: VecDeque::with_capacity(period),
        })
    }

    /// RSI over the last `period` changes of a whole series
    pub fn from_series(prices: &[f64], period: usize) -> Result<f64> {
        let mut rsi = Self::new(period)?;
        for &price in prices {
            rsi.update(price);
        }
        rsi.value()
    }

    /// Update the RSI with a new price value
    pub fn update(&mut self, price: f64) {
        if let Some(prev_price) = self.previous_price {
            let change = price - prev_price;
            self.gains.push_back(change.max(0.0));
            self.losses.push_back((-change).max(0.0));

            if self.gains.len() > self.period {
                self.gains.pop_front();
                self.losses.pop_front();
            }
        }

        self.previous_price = Some(price);
    }

    /// Get the current RSI value (0-100).
    ///
    /// Uses as many changes as are available up to `period`. The average
    /// loss is floored at [`LOSS_FLOOR`]: a window without losses has
    /// `rs = avg_gain / LOSS_FLOOR` and one without any movement reads 0.
    pub fn value(&self) -> Result<f64> {
        if self.gains.is_empty() {
            return Err(MathError::InsufficientData(
                "RSI needs at least 2 prices".to_string(),
            ));
        }

        let count = self.gains.len() as f64;
        let avg_gain = self.gains.iter().sum::<f64>() / count;
        let avg_loss = self.losses.iter().sum::<f64>() / count;

        let rs = avg_gain / avg_loss.max(LOSS_FLOOR);
        Ok(100.0 - 100.0 / (1.0 + rs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rsi_needs_two_prices() {
        let mut rsi = RelativeStrengthIndex::new(14).unwrap();
        assert!(rsi.value().is_err());
        rsi.update(10.0);
        assert!(rsi.value().is_err());
        rsi.update(10.5);
        assert!(rsi.value().is_ok());
    }

    #[test]
    fn test_rsi_balanced_moves() {
        // +1, -1, +1, -1
        let rsi = RelativeStrengthIndex::from_series(&[10.0, 11.0, 10.0, 11.0, 10.0], 14).unwrap();
        assert_relative_eq!(rsi, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_only_gains_uses_loss_floor() {
        let prices: Vec<f64> = (0..20).map(|i| 10.0 + i as f64 * 0.1).collect();
        let rsi = RelativeStrengthIndex::from_series(&prices, 14).unwrap();
        // avg gain 0.1 over a 0.001 floor: rs = 100
        assert_relative_eq!(rsi, 100.0 - 100.0 / 101.0, epsilon = 1e-6);
        assert!(rsi < 100.0);
    }

    #[test]
    fn test_rsi_flat_series_reads_zero() {
        // no gains over the floored loss: rs = 0
        let rsi = RelativeStrengthIndex::from_series(&[5.0; 10], 14).unwrap();
        assert_eq!(rsi, 0.0);
    }

    #[test]
    fn test_rsi_window_slides() {
        let mut rsi = RelativeStrengthIndex::new(2).unwrap();
        for p in [10.0, 9.0, 8.0, 9.0, 10.0] {
            rsi.update(p);
        }
        // only the last two changes (+1, +1) remain
        assert_relative_eq!(rsi.value().unwrap(), 100.0 - 100.0 / 1001.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_invalid_input() {
        assert!(RelativeStrengthIndex::new(0).is_err());
        assert!(RelativeStrengthIndex::from_series(&[1.0], 14).is_err());
    }
}
