//! Historical rate data handling for forecasting

use crate::dates::{DateInput, DateNormalizer};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One historical point as delivered by a provider, before any filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRatePoint {
    pub date: DateInput,
    #[serde(default)]
    pub buy_avg: Option<f64>,
    #[serde(default)]
    pub buy_min: Option<f64>,
    #[serde(default)]
    pub buy_max: Option<f64>,
    #[serde(default)]
    pub sell_avg: Option<f64>,
    #[serde(default)]
    pub sell_min: Option<f64>,
    #[serde(default)]
    pub sell_max: Option<f64>,
}

impl RawRatePoint {
    /// Point carrying only the daily averages
    pub fn new(date: impl Into<DateInput>, buy_avg: f64, sell_avg: f64) -> Self {
        Self {
            date: date.into(),
            buy_avg: Some(buy_avg),
            buy_min: None,
            buy_max: None,
            sell_avg: Some(sell_avg),
            sell_min: None,
            sell_max: None,
        }
    }

    pub fn with_buy_range(mut self, min: f64, max: f64) -> Self {
        self.buy_min = Some(min);
        self.buy_max = Some(max);
        self
    }

    pub fn with_sell_range(mut self, min: f64, max: f64) -> Self {
        self.sell_min = Some(min);
        self.sell_max = Some(max);
        self
    }
}

/// Average, minimum and maximum of one side of the market for a day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl RateBand {
    /// Build a band from optional fields; `None` when the average is unusable.
    /// Missing or non-finite bounds fall back to the average.
    fn from_parts(avg: Option<f64>, min: Option<f64>, max: Option<f64>) -> Option<Self> {
        let avg = avg.filter(|v| v.is_finite() && *v > 0.0)?;
        let bound = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(avg);
        Some(Self {
            avg,
            min: bound(min),
            max: bound(max),
        })
    }

    pub fn flat(value: f64) -> Self {
        Self {
            avg: value,
            min: value,
            max: value,
        }
    }
}

/// A validated historical point with a normalized date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRatePoint {
    pub date: NaiveDate,
    pub buy: RateBand,
    pub sell: RateBand,
}

impl HistoricalRatePoint {
    /// Average sell minus average buy
    pub fn spread(&self) -> f64 {
        self.sell.avg - self.buy.avg
    }
}

/// What to do with points whose date could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnparsedDatePolicy {
    /// Keep the point, dated today
    #[default]
    Retain,
    /// Drop the point from the series
    Drop,
}

/// Filtered, date-ordered history for one currency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSeries {
    points: Vec<HistoricalRatePoint>,
}

impl RateSeries {
    /// Filter and order raw provider output.
    ///
    /// Points without a usable buy or sell average are discarded. The sort
    /// is stable, so points sharing a date keep their provider order.
    pub fn from_raw(
        raw: &[RawRatePoint],
        normalizer: &DateNormalizer,
        policy: UnparsedDatePolicy,
    ) -> Self {
        let mut points = Vec::with_capacity(raw.len());
        let mut missing_fields = 0usize;

        for item in raw {
            let buy = RateBand::from_parts(item.buy_avg, item.buy_min, item.buy_max);
            let sell = RateBand::from_parts(item.sell_avg, item.sell_min, item.sell_max);
            let (buy, sell) = match (buy, sell) {
                (Some(buy), Some(sell)) => (buy, sell),
                _ => {
                    missing_fields += 1;
                    continue;
                }
            };

            let date = match (normalizer.try_normalize(&item.date), policy) {
                (Some(date), _) => date,
                (None, UnparsedDatePolicy::Retain) => normalizer.normalize(&item.date),
                (None, UnparsedDatePolicy::Drop) => {
                    log::warn!("Dropping rate point with unparseable date '{}'", item.date);
                    continue;
                }
            };

            if sell.avg < buy.avg {
                log::warn!(
                    "Negative spread on {}: buy {} above sell {}",
                    date,
                    buy.avg,
                    sell.avg
                );
            }

            points.push(HistoricalRatePoint { date, buy, sell });
        }

        if missing_fields > 0 {
            log::warn!(
                "Discarded {} of {} rate points with missing averages",
                missing_fields,
                raw.len()
            );
        }

        Self::from_points(points)
    }

    /// Wrap already-validated points, ordering them by date
    pub fn from_points(mut points: Vec<HistoricalRatePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    /// Daily series with the given buy averages starting at `start`.
    ///
    /// Sell averages carry a 1% markup.
    pub fn from_buy_averages(start: NaiveDate, values: &[f64]) -> Self {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| HistoricalRatePoint {
                date: start + Duration::days(i as i64),
                buy: RateBand::flat(v),
                sell: RateBand::flat(v * 1.01),
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[HistoricalRatePoint] {
        &self.points
    }

    /// Average buy rate of each point, oldest first
    pub fn buy_averages(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.buy.avg).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Latest date in the series
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Split into the first `at` points and the rest
    pub fn split_at(&self, at: usize) -> (RateSeries, RateSeries) {
        let at = at.min(self.points.len());
        let (head, tail) = self.points.split_at(at);
        (
            RateSeries {
                points: head.to_vec(),
            },
            RateSeries {
                points: tail.to_vec(),
            },
        )
    }
}
