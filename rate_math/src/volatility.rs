//! Return-series statistics
//!
//! - Day-over-day returns
//! - Population volatility (standard deviation of returns)
//! - Momentum over a lookback

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Day-over-day fractional changes: `p[t] / p[t-1] - 1`.
///
/// Pairs with a non-positive previous value are skipped.
pub fn returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Population standard deviation; zero for fewer than two samples
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sd = values.iter().population_std_dev();
    if sd.is_finite() {
        sd
    } else {
        0.0
    }
}

/// Population volatility of the returns of `prices`
pub fn return_volatility(prices: &[f64]) -> f64 {
    population_std_dev(&returns(prices))
}

/// Population volatility of the last `window` returns
pub fn trailing_volatility(prices: &[f64], window: usize) -> f64 {
    let all = returns(prices);
    let start = all.len().saturating_sub(window);
    population_std_dev(&all[start..])
}

/// Fractional change between the last value and the one `lookback` steps before it
pub fn momentum(prices: &[f64], lookback: usize) -> Result<f64> {
    if lookback == 0 {
        return Err(MathError::InvalidInput(
            "Momentum lookback must be greater than zero".to_string(),
        ));
    }
    if prices.len() <= lookback {
        return Err(MathError::InsufficientData(format!(
            "Momentum over {} steps needs {} values, have {}",
            lookback,
            lookback + 1,
            prices.len()
        )));
    }

    let last = prices[prices.len() - 1];
    let base = prices[prices.len() - 1 - lookback];
    if base <= 0.0 {
        return Err(MathError::CalculationError(
            "Momentum base value must be positive".to_string(),
        ));
    }

    Ok(last / base - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_returns() {
        let r = returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert_relative_eq!(r[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(r[1], -0.1, epsilon = 1e-12);
        assert!(returns(&[1.0]).is_empty());
    }

    #[test]
    fn test_population_std_dev() {
        // mean 5, squared deviations sum to 32 over 8 samples
        let sd = population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(sd, 2.0, epsilon = 1e-12);
        assert_eq!(population_std_dev(&[3.0]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
    }

    #[test]
    fn test_constant_growth_has_no_volatility() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        assert!(return_volatility(&prices) < 1e-12);
    }

    #[test]
    fn test_trailing_volatility_uses_tail() {
        // noisy head, calm tail
        let mut prices = vec![100.0, 120.0, 90.0, 130.0];
        prices.extend(std::iter::repeat(130.0).take(5));
        assert!(return_volatility(&prices) > 0.0);
        assert_eq!(trailing_volatility(&prices, 4), 0.0);
    }

    #[test]
    fn test_momentum() {
        let prices = [100.0, 101.0, 102.0, 103.0, 104.0, 110.0];
        assert_relative_eq!(momentum(&prices, 5).unwrap(), 0.1, epsilon = 1e-12);
        assert!(momentum(&prices, 6).is_err());
        assert!(momentum(&prices, 0).is_err());
    }
}
