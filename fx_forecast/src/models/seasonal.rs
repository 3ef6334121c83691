//! Seasonal exponential smoothing (Holt-Winters style)
//!
//! Additive trend with multiplicative seasonal indices over a weekly period
//! (shorter when the series is short). Output carries a bounded random
//! jitter proportional to the historical volatility, so repeated runs
//! differ unless the caller supplies a seeded generator.

use crate::data::RateSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    clamp_confidence, clamp_rate, forecast_date, ForecastDay, ForecastMethod, ForecastModel,
    TrainedForecastModel, Trend,
};
use chrono::NaiveDate;
use rand::{Rng, RngCore};
use rate_math::volatility::return_volatility;

const MAX_PERIOD: usize = 7;
const START_CONFIDENCE: f64 = 0.9;
const CONFIDENCE_DECAY: f64 = 0.02;
const MAX_JITTER: f64 = 0.1;
const TREND_DEADBAND: f64 = 0.0005;

/// Seasonal smoothing model with fixed smoothing constants
#[derive(Debug, Clone)]
pub struct SeasonalSmoothingForecaster {
    name: String,
    /// Level smoothing
    alpha: f64,
    /// Trend smoothing
    beta: f64,
    /// Season smoothing
    gamma: f64,
}

/// Trained seasonal smoothing model
#[derive(Debug, Clone)]
pub struct TrainedSeasonal {
    name: String,
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    observations: usize,
    /// Population volatility of daily returns, as a fraction
    volatility: f64,
    anchor: NaiveDate,
}

impl SeasonalSmoothingForecaster {
    /// Create a model with custom smoothing constants, each in (0, 1)
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        for (label, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if value <= 0.0 || value >= 1.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be between 0 and 1",
                    label
                )));
            }
        }

        Ok(Self {
            name: format!(
                "Seasonal Smoothing (alpha={}, beta={}, gamma={})",
                alpha, beta, gamma
            ),
            alpha,
            beta,
            gamma,
        })
    }
}

impl Default for SeasonalSmoothingForecaster {
    fn default() -> Self {
        Self {
            name: "Seasonal Smoothing (alpha=0.3, beta=0.1, gamma=0.3)".to_string(),
            alpha: 0.3,
            beta: 0.1,
            gamma: 0.3,
        }
    }
}

/// Seasonal indices from the first two periods, scaled to mean 1
fn initial_seasonal(values: &[f64], period: usize) -> Vec<f64> {
    let raw: Vec<f64> = (0..period)
        .map(|j| {
            let samples: Vec<f64> = [j, j + period]
                .iter()
                .filter_map(|&idx| values.get(idx).copied())
                .collect();
            samples.iter().sum::<f64>() / samples.len() as f64
        })
        .collect();

    let mean = raw.iter().sum::<f64>() / raw.len() as f64;
    if mean > 0.0 && mean.is_finite() {
        raw.iter().map(|s| s / mean).collect()
    } else {
        vec![1.0; period]
    }
}

impl ForecastModel for SeasonalSmoothingForecaster {
    type Trained = TrainedSeasonal;

    fn train(&self, series: &RateSeries) -> Result<Self::Trained> {
        self.method().ensure_enough_points(series.len())?;
        let anchor = series
            .last_date()
            .ok_or_else(|| ForecastError::InvalidParameter("Empty rate series".to_string()))?;

        let values = series.buy_averages();
        let n = values.len();
        let period = MAX_PERIOD.min(n - 1);

        let mut level = values[0];
        let mut trend = (values[n - 1] - values[0]) / (n - 1) as f64;
        let mut seasonal = initial_seasonal(&values, period);

        for (t, &value) in values.iter().enumerate().skip(1) {
            let s = t % period;
            let previous_level = level;
            level = self.alpha * (value / seasonal[s]) + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - previous_level) + (1.0 - self.beta) * trend;
            seasonal[s] =
                self.gamma * (value / level.max(f64::EPSILON)) + (1.0 - self.gamma) * seasonal[s];
        }

        Ok(TrainedSeasonal {
            name: self.name.clone(),
            level,
            trend,
            seasonal,
            observations: n,
            volatility: return_volatility(&values),
            anchor,
        })
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Advanced
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeasonal {
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn trend(&self) -> f64 {
        self.trend
    }

    pub fn seasonal_indices(&self) -> &[f64] {
        &self.seasonal
    }

    /// Volatility of daily returns as a fraction
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    fn seasonal_index(&self, day: usize) -> f64 {
        self.seasonal[(self.observations + day - 1) % self.seasonal.len()]
    }
}

impl TrainedForecastModel for TrainedSeasonal {
    fn forecast(&self, horizon: usize, rng: &mut dyn RngCore) -> Result<Vec<ForecastDay>> {
        let floor = ForecastMethod::Advanced.confidence_floor();
        let jitter_scale = MAX_JITTER.min(self.volatility / 2.0);

        let mut days = Vec::with_capacity(horizon);
        for day in 1..=horizon {
            let index = self.seasonal_index(day);
            let base = clamp_rate((self.level + day as f64 * self.trend) * index);
            let jitter = 1.0 + rng.gen_range(-1.0f64..1.0) * jitter_scale;

            days.push(ForecastDay {
                day,
                date: forecast_date(self.anchor, day),
                buy: clamp_rate(base * jitter),
                confidence: clamp_confidence(
                    START_CONFIDENCE - CONFIDENCE_DECAY * day as f64 - 2.0 * self.volatility,
                    floor,
                ),
                trend: Trend::from_signed(self.trend * index, TREND_DEADBAND),
                volatility: Some(self.volatility * 100.0),
                rsi: None,
            });
        }

        Ok(days)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
