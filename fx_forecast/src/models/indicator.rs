//! Technical-indicator forecaster
//!
//! Combines moving-average ratios, RSI mean reversion, short-term momentum
//! and a day-of-week factor into a daily change that is compounded over the
//! horizon. Jitter shrinks as confidence rises.

use crate::data::RateSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    clamp_confidence, clamp_rate, forecast_date, ForecastDay, ForecastMethod, ForecastModel,
    TrainedForecastModel, Trend,
};
use chrono::{Datelike, NaiveDate};
use rand::{Rng, RngCore};
use rate_math::moving_averages::trailing_mean;
use rate_math::volatility::{momentum, trailing_volatility};
use rate_math::RelativeStrengthIndex;

const SHORT_WINDOW: usize = 5;
const MID_WINDOW: usize = 10;
const LONG_WINDOW: usize = 20;
const RSI_PERIOD: usize = 14;
const VOLATILITY_WINDOW: usize = 14;
const MOMENTUM_LOOKBACK: usize = 5;

const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;
/// Daily pull back toward the band at the RSI extremes
const RSI_REVERSION: f64 = 0.002;
const MA_TREND_WEIGHT: f64 = 0.1;
/// Days over which the MA trend keeps full weight
const MA_TREND_DAYS: f64 = 7.0;
const MOMENTUM_DECAY_DAYS: f64 = 10.0;

const START_CONFIDENCE: f64 = 0.9;
const CONFIDENCE_DECAY: f64 = 0.04;
const MAX_JITTER: f64 = 0.1;
const TREND_DEADBAND: f64 = 0.0005;

/// Indicator-driven heuristic model
#[derive(Debug, Clone)]
pub struct IndicatorForecaster {
    name: String,
}

/// Indicator snapshot taken at the end of the history
#[derive(Debug, Clone)]
pub struct TrainedIndicator {
    name: String,
    last: f64,
    sma_short: f64,
    sma_mid: f64,
    sma_long: f64,
    rsi: f64,
    /// Fraction, population stdev of recent returns
    volatility: f64,
    momentum: f64,
    /// Monday first
    weekday_factors: [f64; 7],
    anchor: NaiveDate,
}

impl IndicatorForecaster {
    pub fn new() -> Self {
        Self {
            name: "Indicator Heuristic".to_string(),
        }
    }
}

impl Default for IndicatorForecaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Multiplicative factor per weekday: one plus the mean day-over-day change
/// observed on that weekday. Weekdays with fewer than two samples stay at 1.
pub(crate) fn weekday_factors(dates: &[NaiveDate], values: &[f64]) -> [f64; 7] {
    let mut sums = [0.0f64; 7];
    let mut counts = [0usize; 7];

    for t in 1..values.len().min(dates.len()) {
        if values[t - 1] <= 0.0 {
            continue;
        }
        let weekday = dates[t].weekday().num_days_from_monday() as usize;
        sums[weekday] += values[t] / values[t - 1] - 1.0;
        counts[weekday] += 1;
    }

    let mut factors = [1.0f64; 7];
    for (i, factor) in factors.iter_mut().enumerate() {
        if counts[i] >= 2 {
            *factor = 1.0 + sums[i] / counts[i] as f64;
        }
    }
    factors
}

impl ForecastModel for IndicatorForecaster {
    type Trained = TrainedIndicator;

    fn train(&self, series: &RateSeries) -> Result<Self::Trained> {
        self.method().ensure_enough_points(series.len())?;
        let anchor = series
            .last_date()
            .ok_or_else(|| ForecastError::InvalidParameter("Empty rate series".to_string()))?;

        let values = series.buy_averages();
        let last = values[values.len() - 1];

        Ok(TrainedIndicator {
            name: self.name.clone(),
            last,
            sma_short: trailing_mean(&values, SHORT_WINDOW)?,
            sma_mid: trailing_mean(&values, MID_WINDOW)?,
            sma_long: trailing_mean(&values, LONG_WINDOW)?,
            rsi: RelativeStrengthIndex::from_series(&values, RSI_PERIOD)?,
            volatility: trailing_volatility(&values, VOLATILITY_WINDOW),
            momentum: momentum(&values, MOMENTUM_LOOKBACK)?,
            weekday_factors: weekday_factors(&series.dates(), &values),
            anchor,
        })
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Ml
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedIndicator {
    pub fn rsi(&self) -> f64 {
        self.rsi
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    /// Volatility of recent returns as a fraction
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn weekday_factors(&self) -> &[f64; 7] {
        &self.weekday_factors
    }

    fn rsi_term(&self) -> f64 {
        if self.rsi > RSI_OVERBOUGHT {
            -(self.rsi - RSI_OVERBOUGHT) / 30.0 * RSI_REVERSION
        } else if self.rsi < RSI_OVERSOLD {
            (RSI_OVERSOLD - self.rsi) / 30.0 * RSI_REVERSION
        } else {
            0.0
        }
    }

    fn ma_ratio(&self) -> f64 {
        let short = if self.sma_mid > 0.0 {
            self.sma_short / self.sma_mid - 1.0
        } else {
            0.0
        };
        let long = if self.sma_long > 0.0 {
            self.sma_mid / self.sma_long - 1.0
        } else {
            0.0
        };
        0.6 * short + 0.4 * long
    }

    /// Momentum carried into forecast day `day`, decaying over ten days
    fn momentum_term(&self, day: usize) -> f64 {
        self.momentum * (-(day as f64) / MOMENTUM_DECAY_DAYS).exp()
    }

    fn trend_term(&self, day: usize) -> f64 {
        self.ma_ratio() * MA_TREND_WEIGHT * (MA_TREND_DAYS / day as f64).min(1.0)
    }

    /// Expected daily change for forecast day `day` falling on `date`
    pub fn daily_change(&self, day: usize, date: NaiveDate) -> f64 {
        let weekday = date.weekday().num_days_from_monday() as usize;
        (self.momentum_term(day) + self.rsi_term() + self.trend_term(day))
            * self.weekday_factors[weekday]
    }
}

impl TrainedForecastModel for TrainedIndicator {
    fn forecast(&self, horizon: usize, rng: &mut dyn RngCore) -> Result<Vec<ForecastDay>> {
        let floor = ForecastMethod::Ml.confidence_floor();
        let jitter_scale = MAX_JITTER.min(self.volatility / 2.0);

        let mut days = Vec::with_capacity(horizon);
        for day in 1..=horizon {
            let date = forecast_date(self.anchor, day);
            let change = self.daily_change(day, date);
            let confidence =
                clamp_confidence(START_CONFIDENCE - CONFIDENCE_DECAY * day as f64, floor);

            let growth = (1.0 + change).max(0.0).powi(day as i32);
            let jitter = 1.0 + rng.gen_range(-1.0f64..1.0) * jitter_scale * (1.0 - confidence);

            days.push(ForecastDay {
                day,
                date,
                buy: clamp_rate(self.last * growth * jitter),
                confidence,
                trend: Trend::from_signed(change, TREND_DEADBAND),
                volatility: Some(self.volatility * 100.0),
                rsi: Some(self.rsi),
            });
        }

        Ok(days)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
