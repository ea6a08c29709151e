//! Cache layer: a process-local façade over a shared key-value store.
//!
//! Every operation is infallible from the caller's perspective: the
//! aggregator and orchestrator are written as if the cache did not exist,
//! with hits being pure latency wins and misses/errors simply falling
//! through to the origin. `moka` backs this with an in-process TTL
//! cache; swapping in a networked store (Redis, memcached) later only
//! touches this file.

use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde::{de::DeserializeOwned, Serialize};

/// TTL for weather forecast cache entries.
pub const FORECAST_TTL: Duration = Duration::from_secs(6 * 3600);
/// TTL for climatological statistics cache entries.
pub const STATS_TTL: Duration = Duration::from_secs(24 * 3600);
/// TTL for a cached whole-prediction result (optional tier).
pub const PREDICTION_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub entry_count: u64,
}

/// A JSON-value cache keyed by string, with per-entry TTL.
///
/// `moka::future::Cache` only supports a single TTL per cache instance, so
/// each logical TTL tier (forecast/stats/prediction) gets its own
/// `Cache<String, CachedValue>` instance internally, and the facade picks
/// the right one by key prefix.
#[derive(Clone)]
pub struct CacheLayer {
    forecast: MokaCache<String, String>,
    stats: MokaCache<String, String>,
    prediction: MokaCache<String, String>,
}

const FORECAST_KEY_PREFIX: &str = "forecast:";
const STATS_KEY_PREFIX: &str = "stats:";
const PREDICTION_KEY_PREFIX: &str = "prediction:";

impl CacheLayer {
    pub fn new() -> Self {
        Self {
            forecast: MokaCache::builder().time_to_live(FORECAST_TTL).build(),
            stats: MokaCache::builder().time_to_live(STATS_TTL).build(),
            prediction: MokaCache::builder().time_to_live(PREDICTION_TTL).build(),
        }
    }

    fn tier_for(&self, key: &str) -> &MokaCache<String, String> {
        if key.starts_with(FORECAST_KEY_PREFIX) {
            &self.forecast
        } else if key.starts_with(STATS_KEY_PREFIX) {
            &self.stats
        } else if key.starts_with(PREDICTION_KEY_PREFIX) {
            &self.prediction
        } else {
            // An unrecognized prefix still gets cached, just with the
            // shortest TTL tier, rather than silently bypassing the cache.
            &self.prediction
        }
    }

    /// Fetch and deserialize a value. Returns `None` on a miss or on a
    /// deserialization failure (logged, never propagated — a stale or
    /// corrupt cache entry must not fail the request).
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.tier_for(key).get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("cache entry for {key} failed to deserialize, dropping: {err}");
                None
            }
        }
    }

    /// Serialize and store a value. A serialization failure is logged and
    /// swallowed — the request proceeds as if this were a cache miss next
    /// time, per the "never break the request" contract.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => {
                self.tier_for(key).insert(key.to_string(), raw).await;
            }
            Err(err) => {
                tracing::warn!("failed to serialize value for cache key {key}: {err}");
            }
        }
    }

    pub async fn delete(&self, key: &str) {
        self.tier_for(key).invalidate(key).await;
    }

    /// Remove every entry whose key starts with `prefix`. `moka` has no
    /// native prefix-scan, so this walks the tier's current key set.
    pub async fn clear_prefix(&self, prefix: &str) {
        for tier in [&self.forecast, &self.stats, &self.prediction] {
            let matching: Vec<String> = tier.iter().map(|(k, _)| (*k).clone()).filter(|k| k.starts_with(prefix)).collect();
            for key in matching {
                tier.invalidate(&key).await;
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.forecast.entry_count() + self.stats.entry_count() + self.prediction.entry_count(),
        }
    }
}

impl Default for CacheLayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Round a coordinate to `decimals` places for cache-key quantization
/// (forecast keys round to ~1 km, stats keys to ~10 km).
pub fn round_coord(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
