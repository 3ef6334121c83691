//! Error types for the fx_forecast crate

use crate::models::ForecastMethod;
use rate_math::MathError;
use thiserror::Error;

/// Errors surfaced by the forecasting engine
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The filtered history is shorter than the method needs
    #[error("Insufficient data for {method} forecast: need at least {required} points, have {actual}")]
    InsufficientData {
        method: ForecastMethod,
        required: usize,
        actual: usize,
    },

    /// The historical series provider failed
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Method name that is not one of linear, advanced or ml
    #[error("Unknown forecast method: {0}")]
    UnknownMethod(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from loading or validating configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from serializing forecasts
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from the underlying rate math
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Whether callers should show this error to the user as a failed forecast
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData { .. } | ForecastError::UpstreamUnavailable(_)
        )
    }
}
