//! Weather provider client: forecast and climatology lookups.
//!
//! A thin `reqwest` client around the external forecast/climatology
//! provider, with a fixed request timeout and a small retry policy for
//! transient failures. Every call
//! goes through the Cache Layer first and single-flights concurrent misses
//! for the same key so a burst of requests for one route doesn't turn into
//! a burst of identical upstream calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::{Mutex, Notify};

use crate::cache::{self, CacheLayer};
use crate::domain::weather::{DailyObservation, WeatherStats};
use crate::domain::WeatherPattern;
use crate::errors::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRIES: u32 = 2;
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);

/// Decimal places forecast cache keys round coordinates to (~1 km).
const FORECAST_KEY_PRECISION: i32 = 2;
/// Decimal places stats cache keys round coordinates to (~10 km).
const STATS_KEY_PRECISION: i32 = 1;
/// Width of an elevation bucket (m) used in stats cache keys.
const ELEVATION_BUCKET_M: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    cache: CacheLayer,
    inflight: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponseBody {
    days: Vec<DailyObservationBody>,
}

#[derive(Debug, Deserialize, Default)]
struct DailyObservationBody {
    temperature_avg_c: Option<f64>,
    temperature_min_c: Option<f64>,
    temperature_max_c: Option<f64>,
    wind_speed_avg_kmh: Option<f64>,
    wind_speed_max_kmh: Option<f64>,
    precipitation_total_mm: Option<f64>,
    cloud_cover_avg_pct: Option<f64>,
    visibility_avg_m: Option<f64>,
}

impl From<DailyObservationBody> for DailyObservation {
    fn from(b: DailyObservationBody) -> Self {
        DailyObservation {
            temperature_avg_c: b.temperature_avg_c,
            temperature_min_c: b.temperature_min_c,
            temperature_max_c: b.temperature_max_c,
            wind_speed_avg_kmh: b.wind_speed_avg_kmh,
            wind_speed_max_kmh: b.wind_speed_max_kmh,
            precipitation_total_mm: b.precipitation_total_mm,
            cloud_cover_avg_pct: b.cloud_cover_avg_pct,
            visibility_avg_m: b.visibility_avg_m,
        }
    }
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, user_agent: &str, cache: CacheLayer) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent.to_string())
            .build()
            .map_err(|e| AppError::InternalInconsistency(format!("failed to build weather HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            cache,
            inflight: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// The 7-day window ending at `date`, for the given location.
    pub async fn fetch_forecast(&self, lat: f64, lon: f64, date: NaiveDate) -> Result<WeatherPattern, AppError> {
        let key = format!(
            "forecast:{:.p$}:{:.p$}:{date}",
            cache::round_coord(lat, FORECAST_KEY_PRECISION),
            cache::round_coord(lon, FORECAST_KEY_PRECISION),
            p = FORECAST_KEY_PRECISION as usize,
        );

        if let Some(cached) = self.cache.get::<WeatherPattern>(&key).await {
            return Ok(cached);
        }

        let pattern = self
            .single_flight(&key, || self.fetch_forecast_uncached(lat, lon, date))
            .await?;
        self.cache.set(&key, &pattern).await;
        Ok(pattern)
    }

    /// Climatological means/variances used as the similarity denominator
    /// when paired samples aren't available.
    pub async fn fetch_statistics(&self, lat: f64, lon: f64, elevation_m: Option<f64>, season: &str) -> Result<WeatherStats, AppError> {
        let elevation_bucket = (elevation_m.unwrap_or(0.0) / ELEVATION_BUCKET_M).round() as i64;
        let key = format!(
            "stats:{:.p$}:{:.p$}:{elevation_bucket}:{season}",
            cache::round_coord(lat, STATS_KEY_PRECISION),
            cache::round_coord(lon, STATS_KEY_PRECISION),
            p = STATS_KEY_PRECISION as usize,
        );

        if let Some(cached) = self.cache.get::<WeatherStats>(&key).await {
            return Ok(cached);
        }

        let stats = self
            .single_flight(&key, || self.fetch_statistics_uncached(lat, lon, elevation_bucket, season))
            .await?;
        self.cache.set(&key, &stats).await;
        Ok(stats)
    }

    /// Ensure only one in-flight request per cache key is ever sent to the
    /// upstream provider; concurrent callers for the same key wait on the
    /// first caller's result instead of each issuing their own request.
    async fn single_flight<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T, AppError>
    where
        T: Clone,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, AppError>>,
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let notify = {
            let mut inflight = self.inflight.lock().await;
            if let Some(existing) = inflight.get(key) {
                Some(existing.clone())
            } else {
                inflight.insert(key.to_string(), Arc::new(Notify::new()));
                None
            }
        };

        if let Some(notify) = notify {
            // Someone else is already fetching this key; wait for them, then
            // read whatever they wrote to the cache.
            notify.notified().await;
            if let Some(cached) = self.cache.get::<T>(key).await {
                return Ok(cached);
            }
            // The leader's fetch failed and left nothing cached; fall through
            // and become the new leader rather than returning a bogus error.
        }

        let result = fetch().await;

        let mut inflight = self.inflight.lock().await;
        if let Some(notify) = inflight.remove(key) {
            notify.notify_waiters();
        }

        result
    }

    async fn fetch_forecast_uncached(&self, lat: f64, lon: f64, date: NaiveDate) -> Result<WeatherPattern, AppError> {
        let url = format!("{}/forecast?lat={lat:.4}&lon={lon:.4}&date={date}", self.base_url);
        let body: ForecastResponseBody = self.get_with_retry(&url).await?;

        let mut days = [DailyObservation::neutral(); crate::domain::weather::WINDOW_DAYS];
        for (slot, observed) in days.iter_mut().zip(body.days.into_iter()) {
            *slot = observed.into();
        }

        Ok(WeatherPattern { days })
    }

    async fn fetch_statistics_uncached(&self, lat: f64, lon: f64, elevation_bucket: i64, season: &str) -> Result<WeatherStats, AppError> {
        let url = format!("{}/stats?lat={lat:.4}&lon={lon:.4}&elevation_bucket={elevation_bucket}&season={season}", self.base_url);
        self.get_with_retry(&url).await
    }

    /// GET with a small retry policy: up to [`MAX_RETRIES`] retries on 429
    /// or 5xx, with exponential backoff starting at [`INITIAL_BACKOFF`].
    /// Any other failure (4xx other than 429, transport error after
    /// exhausting retries) maps to [`AppError::UpstreamUnavailable`].
    async fn get_with_retry<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let mut attempt = 0;
        let mut backoff = INITIAL_BACKOFF;

        loop {
            let outcome = self.http.get(url).send().await;

            match outcome {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<T>()
                        .await
                        .map_err(|e| AppError::UpstreamUnavailable(format!("weather provider returned malformed body: {e}")));
                }
                Ok(response) => {
                    let status = response.status();
                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if !retryable || attempt >= MAX_RETRIES {
                        return Err(AppError::UpstreamUnavailable(format!("weather provider returned HTTP {status}")));
                    }
                }
                Err(err) => {
                    if attempt >= MAX_RETRIES {
                        return Err(AppError::UpstreamUnavailable(format!("weather provider request failed: {err}")));
                    }
                }
            }

            tokio::time::sleep(backoff).await;
            backoff *= 2;
            attempt += 1;
        }
    }
}
