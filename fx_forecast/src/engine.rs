//! Forecast dispatcher
//!
//! [`ForecastEngine`] resolves a method's horizon and lookback window,
//! serves cached results, and otherwise fetches history, filters it and runs
//! the matching forecaster. Concurrent misses for the same key share one
//! fetch and computation.

use crate::cache::{CacheKey, CachedForecast, MemoryResultCache, ResultCache};
use crate::config::ForecastConfig;
use crate::data::RateSeries;
use crate::dates::DateNormalizer;
use crate::error::{ForecastError, Result};
use crate::models::{forecast_series, ForecastMethod};
use crate::provider::HistoricalSeriesProvider;
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Arc, Mutex};

type SharedRng = Mutex<Box<dyn RngCore + Send>>;

/// Multi-method exchange-rate forecaster over a series provider
pub struct ForecastEngine {
    provider: Arc<dyn HistoricalSeriesProvider>,
    cache: Arc<dyn ResultCache>,
    config: ForecastConfig,
    normalizer: DateNormalizer,
    rng: SharedRng,
    inflight: DashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>,
}

impl std::fmt::Debug for ForecastEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastEngine")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .field("inflight", &self.inflight.len())
            .finish()
    }
}

impl ForecastEngine {
    /// Engine with an in-memory cache and an entropy-seeded generator
    pub fn new(provider: Arc<dyn HistoricalSeriesProvider>, config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            cache: Arc::new(MemoryResultCache::new()),
            config,
            normalizer: DateNormalizer::new(),
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
            inflight: DashMap::new(),
        })
    }

    /// Replace the result cache, e.g. to share one between engines
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the random source used by the jittered methods
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    pub fn with_normalizer(mut self, normalizer: DateNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn ResultCache> {
        &self.cache
    }

    /// Forecast `currency` against the base currency with `method`.
    ///
    /// Returns one point per horizon day. Fails with `InsufficientData`
    /// when the filtered history is shorter than the method minimum, and
    /// passes provider failures through unchanged.
    pub async fn forecast(&self, currency: &str, method: ForecastMethod) -> Result<CachedForecast> {
        let currency = normalize_currency(currency)?;
        let key = CacheKey::new(currency.clone(), method);

        if let Some(hit) = self.cache.get(&key) {
            log::debug!("Cache hit for {}", key);
            return Ok(hit);
        }

        let gate = self.gate_for(&key);
        let result = {
            let _guard = gate.lock().await;
            // a concurrent caller may have filled the entry while we waited
            match self.cache.get(&key) {
                Some(hit) => {
                    log::debug!("Cache filled while waiting for {}", key);
                    Ok(hit)
                }
                None => self.compute(&currency, method, key.clone()).await,
            }
        };

        self.release_gate(&key, gate);
        result
    }

    /// Like [`forecast`](Self::forecast), parsing the method name first
    pub async fn forecast_by_name(&self, currency: &str, method: &str) -> Result<CachedForecast> {
        let method: ForecastMethod = method.parse()?;
        self.forecast(currency, method).await
    }

    /// Drop the cached forecast for `currency` and `method`
    pub fn invalidate(&self, currency: &str, method: ForecastMethod) -> Result<()> {
        let currency = normalize_currency(currency)?;
        self.cache.invalidate(&CacheKey::new(currency, method));
        Ok(())
    }

    fn gate_for(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let entry = self.inflight.entry(key.clone()).or_default();
        Arc::clone(entry.value())
    }

    /// Forget the gate once no other request holds it
    fn release_gate(&self, key: &CacheKey, gate: Arc<tokio::sync::Mutex<()>>) {
        drop(gate);
        self.inflight
            .remove_if(key, |_, gate| Arc::strong_count(gate) == 1);
    }

    async fn compute(
        &self,
        currency: &str,
        method: ForecastMethod,
        key: CacheKey,
    ) -> Result<CachedForecast> {
        log::debug!("Cache miss for {}, fetching {} days", key, method.window_days());
        let raw = self.provider.fetch(currency, method.window_days()).await?;
        log::debug!("Fetched {} raw points for {}", raw.len(), currency);

        let series = RateSeries::from_raw(&raw, &self.normalizer, self.config.unparsed_dates);
        method.ensure_enough_points(series.len())?;

        let days = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            forecast_series(method, &series, method.horizon_days(), &mut **rng)?
        };

        let base = self.config.base_currency.as_str();
        let points: CachedForecast = Arc::new(
            days.into_iter()
                .map(|day| day.into_point(currency, base))
                .collect(),
        );

        log::info!(
            "Computed {}-day {} forecast for {}/{} from {} points",
            points.len(),
            method,
            currency,
            base,
            series.len()
        );

        self.cache
            .set(key, Arc::clone(&points), self.config.cache_ttl());
        Ok(points)
    }
}

/// Trim and upper-case a currency code
fn normalize_currency(currency: &str) -> Result<String> {
    let code = currency.trim().to_uppercase();
    if code.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Currency code must not be empty".to_string(),
        ));
    }
    Ok(code)
}
