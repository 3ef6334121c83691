//! Metrics for evaluating forecast accuracy

use crate::data::RateSeries;
use crate::error::{ForecastError, Result};
use crate::models::{forecast_series, ForecastMethod};
use rand::RngCore;
use std::fmt;

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE {:.4}, RMSE {:.4}, MAPE {:.2}%, sMAPE {:.2}%",
            self.mae, self.rmse, self.mape, self.smape
        )
    }
}

/// Compare forecast values against actual values of the same length
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual)
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    // zero actuals contribute nothing to MAPE
    let mape = actual
        .iter()
        .zip(&errors)
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, e)| e.abs() / a.abs() * 100.0)
        .sum::<f64>()
        / n;

    let smape = actual
        .iter()
        .zip(forecast)
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        smape,
    })
}

/// Outcome of a holdout evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct HoldoutEvaluation {
    pub method: ForecastMethod,
    /// Points the model was trained on
    pub train_len: usize,
    /// Points compared against the forecast
    pub holdout_len: usize,
    pub accuracy: ForecastAccuracy,
}

/// Backtest `method` by forecasting the tail of `series` from the rest.
///
/// Holds out `min(horizon, len - min_points)` points so the training part
/// still satisfies the method minimum.
pub fn evaluate_holdout(
    series: &RateSeries,
    method: ForecastMethod,
    rng: &mut dyn RngCore,
) -> Result<HoldoutEvaluation> {
    let holdout_len = method
        .horizon_days()
        .min(series.len().saturating_sub(method.min_points()));
    if holdout_len == 0 {
        return Err(ForecastError::InsufficientData {
            method,
            required: method.min_points() + 1,
            actual: series.len(),
        });
    }

    let (train, test) = series.split_at(series.len() - holdout_len);
    let forecast: Vec<f64> = forecast_series(method, &train, holdout_len, rng)?
        .into_iter()
        .map(|day| day.buy)
        .collect();
    let accuracy = forecast_accuracy(&forecast, &test.buy_averages())?;

    log::info!(
        "Holdout for {} over {} points: {}",
        method,
        holdout_len,
        accuracy
    );

    Ok(HoldoutEvaluation {
        method,
        train_len: train.len(),
        holdout_len,
        accuracy,
    })
}
