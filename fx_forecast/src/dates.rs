//! Date normalization for historical rate points
//!
//! Upstream history arrives with dates in several shapes: ISO dates,
//! `DD.MM.YYYY` strings from the central bank feed, full timestamps, or
//! already-typed values. [`DateNormalizer::normalize`] turns any of these
//! into a calendar date and never fails: anything unparseable becomes
//! "today" and is reported through a warning.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A date as handed over by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::Date(value)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::Timestamp(value)
    }
}

impl fmt::Display for DateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateInput::Date(d) => write!(f, "{}", d),
            DateInput::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            DateInput::Text(s) => f.write_str(s),
        }
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S",
];

/// Converts heterogeneous date representations into calendar dates
#[derive(Debug, Clone, Default)]
pub struct DateNormalizer {
    /// Fallback date; `None` means the current UTC date
    today: Option<NaiveDate>,
}

impl DateNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer whose fallback "today" is pinned to `today`
    pub fn with_fixed_today(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    /// The date used when parsing fails
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Parse a date string in any of the accepted layouts
    pub fn parse_text(text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(date);
            }
        }

        if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
            return Some(ts.with_timezone(&Utc).date_naive());
        }
        if let Ok(ts) = DateTime::parse_from_rfc2822(text) {
            return Some(ts.with_timezone(&Utc).date_naive());
        }

        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|dt| dt.date())
    }

    /// Fallible variant of [`normalize`](Self::normalize)
    pub fn try_normalize(&self, input: &DateInput) -> Option<NaiveDate> {
        match input {
            DateInput::Date(date) => Some(*date),
            DateInput::Timestamp(ts) => Some(ts.date_naive()),
            DateInput::Text(text) => Self::parse_text(text),
        }
    }

    /// Normalize `input`, falling back to today when it cannot be parsed
    pub fn normalize(&self, input: &DateInput) -> NaiveDate {
        match self.try_normalize(input) {
            Some(date) => date,
            None => {
                let today = self.today();
                log::warn!(
                    "Unparseable date '{}' in rate history, using {} instead",
                    input,
                    today
                );
                today
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_and_dotted_dates_agree() {
        let normalizer = DateNormalizer::new();
        assert_eq!(normalizer.normalize(&"2024-01-05".into()), ymd(2024, 1, 5));
        assert_eq!(normalizer.normalize(&"05.01.2024".into()), ymd(2024, 1, 5));
    }

    #[test]
    fn test_generic_forms() {
        assert_eq!(
            DateNormalizer::parse_text("2024-01-05T23:30:00+00:00"),
            Some(ymd(2024, 1, 5))
        );
        // converted to UTC before taking the date
        assert_eq!(
            DateNormalizer::parse_text("2024-01-06T01:00:00+03:00"),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(
            DateNormalizer::parse_text("Fri, 05 Jan 2024 10:00:00 GMT"),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(
            DateNormalizer::parse_text("2024-01-05 12:00:00"),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(DateNormalizer::parse_text("2024/01/05"), Some(ymd(2024, 1, 5)));
        assert_eq!(DateNormalizer::parse_text("01/05/2024"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_typed_inputs_pass_through() {
        let normalizer = DateNormalizer::new();
        let date = ymd(2023, 12, 31);
        assert_eq!(normalizer.normalize(&DateInput::Date(date)), date);

        let ts = date.and_hms_opt(18, 0, 0).unwrap().and_utc();
        assert_eq!(normalizer.normalize(&DateInput::Timestamp(ts)), date);
    }

    #[test]
    fn test_garbage_falls_back_to_today() {
        let today = ymd(2024, 3, 1);
        let normalizer = DateNormalizer::with_fixed_today(today);
        assert_eq!(normalizer.normalize(&"garbage".into()), today);
        assert_eq!(normalizer.normalize(&"".into()), today);
        // not a calendar date
        assert_eq!(normalizer.normalize(&"2024-02-30".into()), today);
        assert_eq!(normalizer.try_normalize(&"31.02.2024".into()), None);
    }

    #[test]
    fn test_unpinned_fallback_is_current_date() {
        let normalizer = DateNormalizer::new();
        let before = Utc::now().date_naive();
        let date = normalizer.normalize(&"not a date".into());
        let after = Utc::now().date_naive();
        assert!(date >= before && date <= after);
    }
}
