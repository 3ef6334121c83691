//! Forecasting models for exchange-rate series

use crate::data::RateSeries;
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

pub mod indicator;
pub mod linear;
pub mod seasonal;

pub use indicator::IndicatorForecaster;
pub use linear::LinearForecaster;
pub use seasonal::SeasonalSmoothingForecaster;

/// Markup applied to a forecast buy rate to derive the sell rate
pub const SPREAD: f64 = 0.01;

/// Lowest rate a forecast may produce
pub const MIN_RATE: f64 = 0.01;

/// Highest confidence any forecast day may carry
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Forecasting method requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    /// Least-squares trend
    Linear,
    /// Seasonal exponential smoothing
    Advanced,
    /// Technical-indicator heuristic
    Ml,
}

impl ForecastMethod {
    pub const ALL: [ForecastMethod; 3] = [
        ForecastMethod::Linear,
        ForecastMethod::Advanced,
        ForecastMethod::Ml,
    ];

    /// Number of future days produced
    pub fn horizon_days(self) -> usize {
        match self {
            ForecastMethod::Linear => 7,
            ForecastMethod::Advanced => 14,
            ForecastMethod::Ml => 30,
        }
    }

    /// Days of history requested from the provider
    pub fn window_days(self) -> u32 {
        match self {
            ForecastMethod::Linear => 60,
            ForecastMethod::Advanced => 90,
            ForecastMethod::Ml => 180,
        }
    }

    /// Minimum number of filtered points needed to compute
    pub fn min_points(self) -> usize {
        match self {
            ForecastMethod::Linear => 2,
            ForecastMethod::Advanced => 7,
            ForecastMethod::Ml => 14,
        }
    }

    /// Lowest confidence a forecast day may fall to
    pub fn confidence_floor(self) -> f64 {
        match self {
            ForecastMethod::Linear => 0.6,
            ForecastMethod::Advanced => 0.4,
            ForecastMethod::Ml => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ForecastMethod::Linear => "linear",
            ForecastMethod::Advanced => "advanced",
            ForecastMethod::Ml => "ml",
        }
    }

    /// Fail with `InsufficientData` when `available` points are too few
    pub fn ensure_enough_points(self, available: usize) -> Result<()> {
        if available < self.min_points() {
            return Err(ForecastError::InsufficientData {
                method: self,
                required: self.min_points(),
                actual: available,
            });
        }
        Ok(())
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastMethod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(ForecastMethod::Linear),
            "advanced" => Ok(ForecastMethod::Advanced),
            "ml" => Ok(ForecastMethod::Ml),
            other => Err(ForecastError::UnknownMethod(other.to_string())),
        }
    }
}

/// Direction of a forecast day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Positive,
    Negative,
    Stable,
}

impl Trend {
    /// Label a signed value, treating `[-deadband, deadband]` as stable
    pub fn from_signed(value: f64, deadband: f64) -> Self {
        if value > deadband {
            Trend::Positive
        } else if value < -deadband {
            Trend::Negative
        } else {
            Trend::Stable
        }
    }
}

/// One forecast day as produced by a model, before currency labels are attached
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    /// 1-based day index
    pub day: usize,
    pub date: NaiveDate,
    pub buy: f64,
    pub confidence: f64,
    pub trend: Trend,
    /// Volatility in percent
    pub volatility: Option<f64>,
    pub rsi: Option<f64>,
}

impl ForecastDay {
    pub fn into_point(self, currency: &str, base_currency: &str) -> ForecastPoint {
        ForecastPoint {
            date: self.date,
            currency: currency.to_string(),
            base_currency: base_currency.to_string(),
            buy: self.buy,
            sell: self.buy * (1.0 + SPREAD),
            confidence: self.confidence,
            trend: self.trend,
            volatility: self.volatility,
            rsi: self.rsi,
        }
    }
}

/// A forecast rate for one future day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub currency: String,
    pub base_currency: String,
    pub buy: f64,
    pub sell: f64,
    pub confidence: f64,
    pub trend: Trend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
}

/// Serialize a forecast sequence as a JSON array
pub fn forecast_to_json(points: &[ForecastPoint]) -> Result<String> {
    Ok(serde_json::to_string(points)?)
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Produce `horizon` forecast days. Models without randomness ignore `rng`.
    fn forecast(&self, horizon: usize, rng: &mut dyn RngCore) -> Result<Vec<ForecastDay>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a rate series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a filtered rate series
    fn train(&self, series: &RateSeries) -> Result<Self::Trained>;

    /// Method this model implements
    fn method(&self) -> ForecastMethod;

    fn name(&self) -> &str;
}

/// Run the default model for `method` over `series`
pub fn forecast_series(
    method: ForecastMethod,
    series: &RateSeries,
    horizon: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<ForecastDay>> {
    match method {
        ForecastMethod::Linear => run_model(&LinearForecaster::new(), series, horizon, rng),
        ForecastMethod::Advanced => {
            run_model(&SeasonalSmoothingForecaster::default(), series, horizon, rng)
        }
        ForecastMethod::Ml => run_model(&IndicatorForecaster::default(), series, horizon, rng),
    }
}

fn run_model<M: ForecastModel>(
    model: &M,
    series: &RateSeries,
    horizon: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<ForecastDay>> {
    let trained = model.train(series)?;
    log::debug!(
        "Trained {} on {} points, forecasting {} days",
        trained.name(),
        series.len(),
        horizon
    );
    trained.forecast(horizon, rng)
}

/// Floor a rate at [`MIN_RATE`]; non-finite values collapse to the floor
pub(crate) fn clamp_rate(value: f64) -> f64 {
    if value.is_finite() {
        value.max(MIN_RATE)
    } else {
        MIN_RATE
    }
}

/// Bound a confidence score to `[floor, MAX_CONFIDENCE]`
pub(crate) fn clamp_confidence(value: f64, floor: f64) -> f64 {
    if value.is_finite() {
        value.clamp(floor, MAX_CONFIDENCE)
    } else {
        floor
    }
}

/// Date of forecast day `day`, counted from the last historical date
pub(crate) fn forecast_date(anchor: NaiveDate, day: usize) -> NaiveDate {
    anchor + Duration::days(day as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_table() {
        let table: Vec<_> = ForecastMethod::ALL
            .iter()
            .map(|m| (m.horizon_days(), m.window_days(), m.min_points()))
            .collect();
        assert_eq!(table, vec![(7, 60, 2), (14, 90, 7), (30, 180, 14)]);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("linear".parse::<ForecastMethod>().unwrap(), ForecastMethod::Linear);
        assert_eq!(" Advanced ".parse::<ForecastMethod>().unwrap(), ForecastMethod::Advanced);
        assert_eq!("ML".parse::<ForecastMethod>().unwrap(), ForecastMethod::Ml);
        assert!(matches!(
            "arima".parse::<ForecastMethod>(),
            Err(ForecastError::UnknownMethod(m)) if m == "arima"
        ));
    }

    #[test]
    fn test_trend_deadband() {
        assert_eq!(Trend::from_signed(0.001, 0.0005), Trend::Positive);
        assert_eq!(Trend::from_signed(-0.001, 0.0005), Trend::Negative);
        assert_eq!(Trend::from_signed(0.0004, 0.0005), Trend::Stable);
        assert_eq!(Trend::from_signed(0.0, 0.0), Trend::Stable);
        assert_eq!(Trend::from_signed(1e-12, 0.0), Trend::Positive);
    }

    #[test]
    fn test_clamps() {
        assert_eq!(clamp_rate(-3.0), MIN_RATE);
        assert_eq!(clamp_rate(f64::NAN), MIN_RATE);
        assert_eq!(clamp_rate(41.5), 41.5);
        assert_eq!(clamp_confidence(0.99, 0.6), MAX_CONFIDENCE);
        assert_eq!(clamp_confidence(0.1, 0.6), 0.6);
        assert_eq!(clamp_confidence(f64::NAN, 0.4), 0.4);
    }

    #[test]
    fn test_point_serialization_omits_absent_indicators() {
        let day = ForecastDay {
            day: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            buy: 40.0,
            confidence: 0.92,
            trend: Trend::Positive,
            volatility: None,
            rsi: None,
        };
        let point = day.into_point("USD", "UAH");
        assert!((point.sell - 40.4).abs() < 1e-9);

        let json = forecast_to_json(&[point]).unwrap();
        assert!(json.contains("\"baseCurrency\":\"UAH\""));
        assert!(json.contains("\"trend\":\"positive\""));
        assert!(json.contains("\"date\":\"2024-01-08\""));
        assert!(!json.contains("volatility"));
        assert!(!json.contains("rsi"));
    }
}
