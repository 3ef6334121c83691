//! Time-boxed memoization of computed forecasts.
//!
//! Entries are keyed by (currency, method, horizon) and expire lazily: an
//! entry past its deadline reads as absent and is removed by that read.

use crate::models::{ForecastMethod, ForecastPoint};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A computed forecast shared between the cache and its readers
pub type CachedForecast = Arc<Vec<ForecastPoint>>;

/// Default lifetime of a cached forecast
pub const DEFAULT_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub currency: String,
    pub method: ForecastMethod,
    pub horizon_days: usize,
}

impl CacheKey {
    /// Key for `method`'s own horizon
    pub fn new(currency: impl Into<String>, method: ForecastMethod) -> Self {
        Self {
            currency: currency.into(),
            method,
            horizon_days: method.horizon_days(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "forecast:{}:{}:{}",
            self.currency, self.method, self.horizon_days
        )
    }
}

/// Storage for computed forecasts
pub trait ResultCache: Send + Sync {
    /// The cached value, or `None` if missing or expired
    fn get(&self, key: &CacheKey) -> Option<CachedForecast>;

    /// Store `value` until `ttl` has elapsed
    fn set(&self, key: CacheKey, value: CachedForecast, ttl: Duration);

    fn invalidate(&self, key: &CacheKey);

    /// Number of stored entries, expired ones included until they are read or purged
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedForecast,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// In-process cache backed by a concurrent map
#[derive(Debug, Default)]
pub struct MemoryResultCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl MemoryResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

impl ResultCache for MemoryResultCache {
    fn get(&self, key: &CacheKey) -> Option<CachedForecast> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(Arc::clone(&entry.value));
            }
        }

        // read guard released above; re-check so a fresh set is not removed
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        log::debug!("Cache entry {} expired", key);
        None
    }

    fn set(&self, key: CacheKey, value: CachedForecast, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now + DEFAULT_TTL);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trend;
    use chrono::NaiveDate;
    use std::thread::sleep;

    fn sample() -> CachedForecast {
        Arc::new(vec![ForecastPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            currency: "USD".to_string(),
            base_currency: "UAH".to_string(),
            buy: 41.0,
            sell: 41.41,
            confidence: 0.92,
            trend: Trend::Stable,
            volatility: None,
            rsi: None,
        }])
    }

    #[test]
    fn test_get_after_set_returns_same_value() {
        let cache = MemoryResultCache::new();
        let key = CacheKey::new("USD", ForecastMethod::Linear);
        let value = sample();

        cache.set(key.clone(), Arc::clone(&value), Duration::from_secs(100));
        let hit = cache.get(&key).unwrap();
        assert!(Arc::ptr_eq(&hit, &value));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let cache = MemoryResultCache::new();
        let key = CacheKey::new("EUR", ForecastMethod::Ml);

        cache.set(key.clone(), sample(), Duration::from_millis(10));
        sleep(Duration::from_millis(30));

        assert!(cache.get(&key).is_none());
        // lazily removed by the read
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_differ_by_method() {
        let cache = MemoryResultCache::new();
        cache.set(
            CacheKey::new("USD", ForecastMethod::Linear),
            sample(),
            Duration::from_secs(100),
        );
        assert!(cache.get(&CacheKey::new("USD", ForecastMethod::Advanced)).is_none());
        assert!(cache.get(&CacheKey::new("EUR", ForecastMethod::Linear)).is_none());
    }

    #[test]
    fn test_invalidate_and_purge() {
        let cache = MemoryResultCache::new();
        let live = CacheKey::new("USD", ForecastMethod::Linear);
        let stale = CacheKey::new("PLN", ForecastMethod::Linear);
        let dropped = CacheKey::new("GBP", ForecastMethod::Linear);

        cache.set(live.clone(), sample(), Duration::from_secs(100));
        cache.set(stale.clone(), sample(), Duration::from_millis(1));
        cache.set(dropped.clone(), sample(), Duration::from_secs(100));

        cache.invalidate(&dropped);
        sleep(Duration::from_millis(10));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&live).is_some());
    }

    #[test]
    fn test_key_display() {
        let key = CacheKey::new("USD", ForecastMethod::Advanced);
        assert_eq!(key.to_string(), "forecast:USD:advanced:14");
    }
}
