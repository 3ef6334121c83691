//! Trend extrapolation
//!
//! Contains an ordinary least-squares fit of a series against its
//! zero-based position. The calendar date plays no role: gaps in the
//! series are treated as if the observations were consecutive.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Least-squares line fitted to `(index, value)` pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    slope: f64,
    intercept: f64,
    len: usize,
}

impl LinearTrend {
    /// Fit a line to the given values, using `0..values.len()` as x
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.len() < 2 {
            return Err(MathError::InsufficientData(format!(
                "Linear trend needs at least 2 points, have {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Linear trend input contains non-finite values".to_string(),
            ));
        }

        let n = values.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            numerator += dx * (y - y_mean);
            denominator += dx * dx;
        }

        if denominator.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        Ok(Self {
            slope,
            intercept,
            len: values.len(),
        })
    }

    /// Value of the fitted line at position `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Extrapolate `periods_ahead` steps past the last fitted point.
    ///
    /// One step ahead of a series of length `n` is position `n`.
    pub fn forecast(&self, periods_ahead: usize) -> f64 {
        self.value_at((self.len + periods_ahead - 1) as f64)
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_trend_on_perfect_line() {
        let trend = LinearTrend::fit(&[10.0, 11.0, 12.0]).unwrap();

        assert_relative_eq!(trend.slope(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(trend.intercept(), 10.0, epsilon = 1e-12);
        // first step ahead lands on index 3
        assert_relative_eq!(trend.forecast(1), 13.0, epsilon = 1e-12);
        assert_relative_eq!(trend.forecast(3), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_trend_flat_series() {
        let trend = LinearTrend::fit(&[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(trend.slope(), 0.0);
        assert_relative_eq!(trend.forecast(10), 5.0);
    }

    #[test]
    fn test_linear_trend_noisy_fit() {
        // y = 1 + x with alternating +-0.1 noise
        let trend = LinearTrend::fit(&[1.1, 1.9, 3.1, 3.9]).unwrap();
        assert_relative_eq!(trend.slope(), 0.96, epsilon = 1e-12);
        assert_relative_eq!(trend.value_at(1.5), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_trend_rejects_short_input() {
        assert!(matches!(
            LinearTrend::fit(&[1.0]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            LinearTrend::fit(&[1.0, f64::NAN]),
            Err(MathError::InvalidInput(_))
        ));
    }
}
