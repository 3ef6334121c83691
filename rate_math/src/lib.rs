//! # Rate Math
//!
//! Numeric building blocks used by the exchange-rate forecasters.
//! Everything here works on plain `f64` slices of daily rates, oldest first.

use thiserror::Error;

pub mod forecasting;
pub mod moving_averages;
pub mod oscillators;
pub mod volatility;

pub use forecasting::LinearTrend;
pub use moving_averages::SimpleMovingAverage;
pub use oscillators::RelativeStrengthIndex;

/// Errors that can occur in rate calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for rate math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = MathError::InsufficientData("need 2 points".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 2 points"
        );
    }
}
