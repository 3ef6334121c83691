//! # FX Forecast
//!
//! Multi-day exchange-rate forecasting for currency pairs quoted against a
//! base currency.
//!
//! ## Features
//!
//! - Date normalization for the mixed formats rate feeds deliver
//! - Filtering of raw history into an ordered [`RateSeries`]
//! - Three forecasting methods with their own horizon and lookback window:
//!   `linear` (7 days), `advanced` seasonal smoothing (14 days) and `ml`
//!   technical-indicator heuristics (30 days)
//! - A time-boxed result cache with single-flight computation per key
//! - In-memory and CSV series providers
//! - Holdout accuracy evaluation
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fx_forecast::{ForecastConfig, ForecastEngine, ForecastMethod, InMemorySeriesProvider, RawRatePoint};
//!
//! # #[tokio::main]
//! # async fn main() -> fx_forecast::Result<()> {
//! let history: Vec<RawRatePoint> = (1..=30)
//!     .map(|d| RawRatePoint::new(format!("{:02}.01.2024", d), 41.0 + d as f64 * 0.02, 41.5))
//!     .collect();
//! let provider = Arc::new(InMemorySeriesProvider::new().with_series("USD", history));
//!
//! let engine = ForecastEngine::new(provider, ForecastConfig::default())?;
//! let forecast = engine.forecast("usd", ForecastMethod::Linear).await?;
//!
//! assert_eq!(forecast.len(), 7);
//! assert_eq!(forecast[0].currency, "USD");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod data;
pub mod dates;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod provider;

pub use cache::{CacheKey, CachedForecast, MemoryResultCache, ResultCache};
pub use config::ForecastConfig;
pub use data::{HistoricalRatePoint, RateBand, RateSeries, RawRatePoint, UnparsedDatePolicy};
pub use dates::{DateInput, DateNormalizer};
pub use engine::ForecastEngine;
pub use error::{ForecastError, Result};
pub use metrics::{evaluate_holdout, forecast_accuracy, ForecastAccuracy, HoldoutEvaluation};
pub use models::{
    forecast_series, forecast_to_json, ForecastDay, ForecastMethod, ForecastModel, ForecastPoint,
    TrainedForecastModel, Trend,
};
pub use provider::{CsvSeriesProvider, HistoricalSeriesProvider, InMemorySeriesProvider};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
