//! # FX Owl
//!
//! Umbrella crate for the exchange-rate forecasting workspace.
//!
//! - [`rate_math`]: numeric building blocks (trend fits, moving averages,
//!   RSI, volatility)
//! - [`fx_forecast`]: the forecasting engine, its providers and result cache
//!
//! ## Example
//!
//! ```
//! use fx_owl_workspace::fx_forecast::ForecastMethod;
//!
//! let method: ForecastMethod = "advanced".parse().unwrap();
//! assert_eq!(method.horizon_days(), 14);
//! assert_eq!(fx_owl_workspace::supported_methods(), vec!["linear", "advanced", "ml"]);
//! ```

pub use fx_forecast;
pub use rate_math;

/// Names of every forecasting method, in horizon order
pub fn supported_methods() -> Vec<&'static str> {
    fx_forecast::ForecastMethod::ALL
        .iter()
        .map(|m| m.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_methods_parse_back() {
        for name in supported_methods() {
            let method: fx_forecast::ForecastMethod = name.parse().unwrap();
            assert_eq!(method.as_str(), name);
        }
    }
}
