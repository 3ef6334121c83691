//! Linear trend forecaster
//!
//! Ordinary least-squares fit of the buy average against the position in
//! the series, extrapolated past the last point. Fully deterministic.

use crate::data::RateSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    clamp_confidence, clamp_rate, forecast_date, ForecastDay, ForecastMethod, ForecastModel,
    TrainedForecastModel, Trend,
};
use chrono::NaiveDate;
use rand::RngCore;
use rate_math::LinearTrend;

const START_CONFIDENCE: f64 = 0.95;
const CONFIDENCE_DECAY: f64 = 0.03;

/// Least-squares trend model
#[derive(Debug, Clone)]
pub struct LinearForecaster {
    name: String,
}

/// Trained linear trend model
#[derive(Debug, Clone)]
pub struct TrainedLinear {
    name: String,
    trend: LinearTrend,
    anchor: NaiveDate,
}

impl LinearForecaster {
    pub fn new() -> Self {
        Self {
            name: "Linear Trend".to_string(),
        }
    }
}

impl Default for LinearForecaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastModel for LinearForecaster {
    type Trained = TrainedLinear;

    fn train(&self, series: &RateSeries) -> Result<Self::Trained> {
        self.method().ensure_enough_points(series.len())?;
        let anchor = series
            .last_date()
            .ok_or_else(|| ForecastError::InvalidParameter("Empty rate series".to_string()))?;

        let trend = LinearTrend::fit(&series.buy_averages())?;

        Ok(TrainedLinear {
            name: self.name.clone(),
            trend,
            anchor,
        })
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Linear
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedLinear {
    pub fn slope(&self) -> f64 {
        self.trend.slope()
    }

    pub fn intercept(&self) -> f64 {
        self.trend.intercept()
    }
}

impl TrainedForecastModel for TrainedLinear {
    fn forecast(&self, horizon: usize, _rng: &mut dyn RngCore) -> Result<Vec<ForecastDay>> {
        let floor = ForecastMethod::Linear.confidence_floor();
        let trend = Trend::from_signed(self.trend.slope(), 0.0);

        let days = (1..=horizon)
            .map(|day| ForecastDay {
                day,
                date: forecast_date(self.anchor, day),
                buy: clamp_rate(self.trend.forecast(day)),
                confidence: clamp_confidence(
                    START_CONFIDENCE - CONFIDENCE_DECAY * day as f64,
                    floor,
                ),
                trend,
                volatility: None,
                rsi: None,
            })
            .collect();

        Ok(days)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
