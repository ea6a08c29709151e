//! Prediction orchestrator: the end-to-end request handler.
//!
//! Resolves elevation, loads and candidate-filters accidents, gathers
//! weather (route forecast + per-accident windows + climatological
//! stats), then hands everything to the influence aggregator. All I/O
//! happens before any scoring — there is no `.await` anywhere inside
//! `aggregator::aggregate`'s call graph.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};

use crate::aggregator::{self, AggregatorMode};
use crate::db;
use crate::domain::query::RouteQuery;
use crate::domain::weather::season_label;
use crate::domain::{Prediction, WeatherPattern, WeatherStats};
use crate::elevation::ElevationClient;
use crate::errors::AppError;
use crate::helpers::haversine_km;
use crate::kernels::PredictionConfig;
use crate::weather::WeatherClient;

#[derive(Clone)]
pub struct Orchestrator {
    pool: sqlx::PgPool,
    weather: WeatherClient,
    elevation: ElevationClient,
    config: Arc<PredictionConfig>,
}

impl Orchestrator {
    pub fn new(pool: sqlx::PgPool, weather: WeatherClient, elevation: ElevationClient, config: Arc<PredictionConfig>) -> Self {
        Self { pool, weather, elevation, config }
    }

    /// Run the full prediction pipeline, aborting with [`AppError::Timeout`]
    /// if `deadline` passes at any suspension point.
    pub async fn predict(&self, query: RouteQuery, deadline: Instant) -> Result<Prediction, AppError> {
        let mut degraded = false;

        // Resolve elevation. Always non-fatal — a miss just leaves
        // the elevation kernel at its neutral weight.
        let route_elevation_m = match query.elevation_meters {
            Some(e) => Some(e),
            None => match timeout(remaining(deadline)?, self.elevation.resolve(query.latitude, query.longitude)).await {
                Ok(elevation) => elevation,
                Err(_) => {
                    tracing::warn!("elevation resolution timed out for ({}, {})", query.latitude, query.longitude);
                    None
                }
            },
        };

        // Load every accident from the store. A transport failure here is
        // fatal; a pool exhaustion gets one retry before surfacing as
        // `ResourceUnavailable`.
        let mut accidents = timeout(remaining(deadline)?, load_accidents_with_retry(&self.pool))
            .await
            .map_err(|_| AppError::Timeout)??;

        // Candidate filter — distance within the local radius, or a
        // strong enough route-type match regardless of distance. Both
        // thresholds are named constants, not re-derived here.
        let matrix = &self.config.route_type_matrix;
        let local_radius_km = self.config.local_radius_km;
        let strict_threshold = self.config.strict_route_type_threshold;
        accidents.retain(|accident| {
            let distance_km = haversine_km(query.latitude, query.longitude, accident.latitude, accident.longitude);
            let route_type_weight = matrix.lookup(query.route_type, accident.route_type);
            distance_km <= local_radius_km || route_type_weight >= strict_threshold
        });

        // Fetch route weather and attach per-accident weather
        // windows concurrently — neither depends on the other's result.
        let weather_fut = self.weather.fetch_forecast(query.latitude, query.longitude, query.target_date);
        let attach_fut = attach_weather_with_retry(&self.pool, &mut accidents);
        let (weather_result, attach_result) = timeout(remaining(deadline)?, async { tokio::join!(weather_fut, attach_fut) })
            .await
            .map_err(|_| AppError::Timeout)?;

        attach_result?;

        let route_weather = match weather_result {
            Ok(pattern) => pattern,
            Err(AppError::UpstreamUnavailable(msg)) => {
                tracing::warn!("route weather unavailable, falling back to neutral pattern: {msg}");
                degraded = true;
                WeatherPattern::neutral()
            }
            Err(other) => return Err(other),
        };

        // Climatological stats back the similarity denominator when an
        // accident's own weather window is present but the route's samples
        // are sparse; a failure here degrades to an all-neutral-variable
        // stats block rather than failing the request.
        let season = season_label(query.target_date);
        let stats = match timeout(
            remaining(deadline)?,
            self.weather.fetch_statistics(query.latitude, query.longitude, route_elevation_m, season),
        )
        .await
        {
            Ok(Ok(stats)) => stats,
            Ok(Err(err)) => {
                tracing::warn!("climatological stats unavailable, similarity denominator degraded: {err}");
                degraded = true;
                WeatherStats::default()
            }
            Err(_) => return Err(AppError::Timeout),
        };

        // CPU-bound scoring, no suspension points past this line.
        let mut prediction = aggregator::aggregate(
            self.config.aggregator_mode,
            &query,
            route_elevation_m,
            &route_weather,
            &stats,
            &accidents,
            &self.config,
        );
        prediction.metadata.degraded = degraded;

        Ok(prediction)
    }
}

fn remaining(deadline: Instant) -> Result<Duration, AppError> {
    let now = Instant::now();
    if now >= deadline {
        return Err(AppError::Timeout);
    }
    Ok(deadline - now)
}

/// `ResourceUnavailable` only surfaces after a single retry.
async fn load_accidents_with_retry(pool: &sqlx::PgPool) -> Result<Vec<crate::domain::AccidentRecord>, AppError> {
    match db::queries::load_all(pool).await {
        Ok(accidents) => Ok(accidents),
        Err(sqlx::Error::PoolTimedOut) => {
            tracing::warn!("accident store connection pool exhausted, retrying once");
            db::queries::load_all(pool).await.map_err(|err| map_pool_error(err, "accident store"))
        }
        Err(other) => Err(AppError::Database(other)),
    }
}

async fn attach_weather_with_retry(pool: &sqlx::PgPool, accidents: &mut [crate::domain::AccidentRecord]) -> Result<(), AppError> {
    match db::queries::attach_weather_windows(pool, accidents).await {
        Ok(()) => Ok(()),
        Err(sqlx::Error::PoolTimedOut) => {
            tracing::warn!("weather window store connection pool exhausted, retrying once");
            db::queries::attach_weather_windows(pool, accidents)
                .await
                .map_err(|err| map_pool_error(err, "weather window store"))
        }
        Err(other) => Err(AppError::Database(other)),
    }
}

fn map_pool_error(err: sqlx::Error, context: &str) -> AppError {
    match err {
        sqlx::Error::PoolTimedOut => AppError::ResourceUnavailable(format!("{context} connection pool exhausted")),
        other => AppError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_errors_once_deadline_has_passed() {
        let past_deadline = Instant::now() - Duration::from_secs(1);
        assert!(matches!(remaining(past_deadline), Err(AppError::Timeout)));
    }

    #[test]
    fn remaining_returns_positive_duration_before_deadline() {
        let deadline = Instant::now() + Duration::from_secs(5);
        let left = remaining(deadline).unwrap();
        assert!(left.as_secs_f64() > 0.0 && left.as_secs_f64() <= 5.0);
    }
}
