//! Engine configuration

use crate::cache::DEFAULT_TTL;
use crate::data::UnparsedDatePolicy;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for [`ForecastEngine`](crate::engine::ForecastEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForecastConfig {
    /// Currency every forecast rate is quoted in
    pub base_currency: String,
    /// Lifetime of a cached forecast, in seconds
    pub cache_ttl_secs: u64,
    /// Handling of history points whose date cannot be parsed
    pub unparsed_dates: UnparsedDatePolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_currency: "UAH".to_string(),
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            unparsed_dates: UnparsedDatePolicy::Retain,
        }
    }
}

impl ForecastConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ForecastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_currency.trim().is_empty() {
            return Err(ForecastError::Config(
                "baseCurrency must not be empty".to_string(),
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ForecastError::Config(
                "cacheTtlSecs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
