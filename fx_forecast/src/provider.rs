//! Sources of historical rate series

use crate::data::RawRatePoint;
use crate::dates::{DateInput, DateNormalizer};
use crate::error::{ForecastError, Result};
use async_trait::async_trait;
use chrono::Duration as DateDuration;
use dashmap::DashMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Supplies raw historical points for a currency
#[async_trait]
pub trait HistoricalSeriesProvider: Send + Sync {
    /// Points covering the last `lookback_days` days, oldest first
    async fn fetch(&self, currency: &str, lookback_days: u32) -> Result<Vec<RawRatePoint>>;
}

/// Keep points dated within `lookback_days` of the latest parseable date.
/// Points whose date cannot be parsed are passed through for the series
/// filter to decide on.
fn trailing_window(points: &[RawRatePoint], lookback_days: u32) -> Vec<RawRatePoint> {
    let normalizer = DateNormalizer::new();
    let dated: Vec<_> = points
        .iter()
        .map(|p| (normalizer.try_normalize(&p.date), p))
        .collect();

    let latest = match dated.iter().filter_map(|(date, _)| *date).max() {
        Some(latest) => latest,
        None => return points.to_vec(),
    };
    let cutoff = latest - DateDuration::days(i64::from(lookback_days));

    dated
        .into_iter()
        .filter(|(date, _)| date.map_or(true, |d| d > cutoff))
        .map(|(_, p)| p.clone())
        .collect()
}

/// Provider over series held in memory
#[derive(Debug, Default)]
pub struct InMemorySeriesProvider {
    series: DashMap<String, Vec<RawRatePoint>>,
    fetches: AtomicUsize,
    delay: Option<Duration>,
}

impl InMemorySeriesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_series(self, currency: &str, points: Vec<RawRatePoint>) -> Self {
        self.insert(currency, points);
        self
    }

    /// Sleep this long inside every fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the series stored for `currency`
    pub fn insert(&self, currency: &str, points: Vec<RawRatePoint>) {
        self.series.insert(currency.trim().to_uppercase(), points);
    }

    /// Number of fetch calls served so far, failed ones included
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoricalSeriesProvider for InMemorySeriesProvider {
    async fn fetch(&self, currency: &str, lookback_days: u32) -> Result<Vec<RawRatePoint>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let points = self
            .series
            .get(currency)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                ForecastError::UpstreamUnavailable(format!("No series stored for {}", currency))
            })?;

        Ok(trailing_window(&points, lookback_days))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow {
    date: String,
    #[serde(default)]
    buy_avg: Option<f64>,
    #[serde(default)]
    buy_min: Option<f64>,
    #[serde(default)]
    buy_max: Option<f64>,
    #[serde(default)]
    sell_avg: Option<f64>,
    #[serde(default)]
    sell_min: Option<f64>,
    #[serde(default)]
    sell_max: Option<f64>,
}

impl From<CsvRow> for RawRatePoint {
    fn from(row: CsvRow) -> Self {
        RawRatePoint {
            date: DateInput::Text(row.date),
            buy_avg: row.buy_avg,
            buy_min: row.buy_min,
            buy_max: row.buy_max,
            sell_avg: row.sell_avg,
            sell_min: row.sell_min,
            sell_max: row.sell_max,
        }
    }
}

/// Provider reading one `<CURRENCY>.csv` file per currency from a directory.
///
/// Files have the header `date,buyAvg,buyMin,buyMax,sellAvg,sellMin,sellMax`;
/// the min/max columns may be left out or empty.
#[derive(Debug, Clone)]
pub struct CsvSeriesProvider {
    dir: PathBuf,
}

impl CsvSeriesProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, currency: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", currency))
    }

    /// Parse CSV content into raw points
    pub fn parse(content: &[u8]) -> Result<Vec<RawRatePoint>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content);

        reader
            .deserialize::<CsvRow>()
            .map(|row| {
                row.map(RawRatePoint::from)
                    .map_err(|e| ForecastError::UpstreamUnavailable(format!("Bad CSV row: {}", e)))
            })
            .collect()
    }
}

#[async_trait]
impl HistoricalSeriesProvider for CsvSeriesProvider {
    async fn fetch(&self, currency: &str, lookback_days: u32) -> Result<Vec<RawRatePoint>> {
        let path = self.path_for(currency);
        let content = tokio::fs::read(&path).await.map_err(|e| {
            ForecastError::UpstreamUnavailable(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let points = Self::parse(&content)?;
        log::debug!("Read {} rows from {}", points.len(), path.display());
        Ok(trailing_window(&points, lookback_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(count: usize) -> Vec<RawRatePoint> {
        (1..=count)
            .map(|d| RawRatePoint::new(format!("2024-01-{:02}", d), 40.0, 40.4))
            .collect()
    }

    #[test]
    fn test_trailing_window_counts_back_from_latest() {
        let window = trailing_window(&daily(20), 7);
        assert_eq!(window.len(), 7);
        assert_eq!(window[0].date.to_string(), "2024-01-14");
    }

    #[test]
    fn test_trailing_window_keeps_unparseable_dates() {
        let mut points = daily(10);
        points.push(RawRatePoint::new("yesterday", 40.0, 40.4));
        let window = trailing_window(&points, 3);
        assert_eq!(window.len(), 4);
    }

    #[tokio::test]
    async fn test_in_memory_fetch() {
        let provider = InMemorySeriesProvider::new().with_series("usd", daily(31));

        let points = provider.fetch("USD", 60).await.unwrap();
        assert_eq!(points.len(), 31);
        assert_eq!(provider.fetch_count(), 1);

        let err = provider.fetch("EUR", 60).await.unwrap_err();
        assert!(matches!(err, ForecastError::UpstreamUnavailable(_)));
        assert_eq!(provider.fetch_count(), 2);
    }

    #[test]
    fn test_csv_parse_with_optional_columns() {
        let content = b"date,buyAvg,buyMin,buyMax,sellAvg,sellMin,sellMax\n\
            2024-01-01,41.0,40.8,41.2,41.5,,\n\
            02.01.2024,41.1,,,41.6,41.4,41.8\n\
            2024-01-03,,,,41.7,,\n";

        let points = CsvSeriesProvider::parse(content).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].buy_min, Some(40.8));
        assert_eq!(points[0].sell_min, None);
        assert_eq!(points[1].date.to_string(), "02.01.2024");
        assert_eq!(points[2].buy_avg, None);
    }

    #[test]
    fn test_csv_parse_rejects_bad_numbers() {
        let content = b"date,buyAvg,sellAvg\n2024-01-01,forty,41.5\n";
        let err = CsvSeriesProvider::parse(content).unwrap_err();
        assert!(matches!(err, ForecastError::UpstreamUnavailable(_)));
    }
}
