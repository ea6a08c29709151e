use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::PgPool;

use super::models::{AccidentRow, WeatherObservationRow};
use crate::domain::accident::{RouteType, Severity};
use crate::domain::weather::{DailyObservation, WINDOW_DAYS};
use crate::domain::{AccidentRecord, WeatherPattern};

const ACCIDENT_COLS: &str = "id, latitude, longitude, elevation_meters, accident_date, route_type, severity";

/// Load every accident with both coordinates and a date.
/// No spatial pre-filter here — filtering by distance/route-type is the
/// orchestrator's job, not the store's.
pub async fn load_all(pool: &PgPool) -> Result<Vec<AccidentRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AccidentRow>(&format!(
        "SELECT {ACCIDENT_COLS} FROM accidents
         WHERE latitude IS NOT NULL AND longitude IS NOT NULL AND accident_date IS NOT NULL"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(row_to_record).collect())
}

/// An accident row with an unparseable `route_type`/`severity` is dropped
/// (logged) rather than failing the whole batch load — one bad row
/// shouldn't take down every prediction.
fn row_to_record(row: AccidentRow) -> Option<AccidentRecord> {
    let route_type = match RouteType::from_str(&row.route_type) {
        Ok(rt) => rt,
        Err(err) => {
            tracing::warn!("accident {} has unparseable route_type: {err}", row.id);
            return None;
        }
    };
    let severity = match Severity::from_str(&row.severity) {
        Ok(sv) => sv,
        Err(err) => {
            tracing::warn!("accident {} has unparseable severity: {err}", row.id);
            return None;
        }
    };

    Some(AccidentRecord {
        id: row.id,
        latitude: row.latitude,
        longitude: row.longitude,
        elevation_meters: row.elevation_meters,
        accident_date: row.accident_date,
        route_type,
        severity,
        weather_pattern: None,
    })
}

/// Populate every accident's `weather_pattern` in a single bulk query:
/// `O(1)` round-trips regardless of `accidents.len()`, via
/// `UNNEST ... WITH ORDINALITY` to pair each accident with its id and date,
/// then a `LEFT JOIN LATERAL` to pull every weather row in its 7-day window.
/// Missing days are left as [`DailyObservation::neutral`] gaps, never
/// invented.
pub async fn attach_weather_windows(pool: &PgPool, accidents: &mut [AccidentRecord]) -> Result<(), sqlx::Error> {
    if accidents.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = accidents.iter().map(|a| a.id).collect();
    let dates: Vec<NaiveDate> = accidents.iter().map(|a| a.accident_date).collect();

    let rows: Vec<WeatherObservationRow> = sqlx::query_as::<_, WeatherObservationRow>(
        "SELECT
            p.idx,
            w.observation_date,
            w.temperature_avg_c,
            w.temperature_min_c,
            w.temperature_max_c,
            w.wind_speed_avg_kmh,
            w.wind_speed_max_kmh,
            w.precipitation_total_mm,
            w.cloud_cover_avg_pct,
            w.visibility_avg_m
         FROM UNNEST($1::bigint[], $2::date[])
              WITH ORDINALITY AS p(accident_id, accident_date, idx)
         LEFT JOIN LATERAL (
             SELECT *
             FROM weather_observations
             WHERE accident_id = p.accident_id
               AND observation_date BETWEEN p.accident_date - 6 AND p.accident_date
         ) w ON true",
    )
    .bind(&ids)
    .bind(&dates)
    .fetch_all(pool)
    .await?;

    let mut by_idx: HashMap<i64, Vec<WeatherObservationRow>> = HashMap::new();
    for row in rows {
        by_idx.entry(row.idx).or_default().push(row);
    }

    for (zero_based_idx, accident) in accidents.iter_mut().enumerate() {
        let ordinality_idx = (zero_based_idx + 1) as i64;
        let mut days = [DailyObservation::neutral(); WINDOW_DAYS];

        if let Some(observations) = by_idx.get(&ordinality_idx) {
            for obs in observations {
                let Some(observation_date) = obs.observation_date else {
                    continue; // the LEFT JOIN found no matching row for this accident
                };
                let offset = (observation_date - accident.accident_date).num_days() + (WINDOW_DAYS as i64 - 1);
                if offset < 0 || offset >= WINDOW_DAYS as i64 {
                    tracing::warn!(
                        "accident {}: weather observation {} outside its 7-day window, dropping",
                        accident.id,
                        observation_date
                    );
                    continue;
                }
                days[offset as usize] = DailyObservation {
                    temperature_avg_c: obs.temperature_avg_c,
                    temperature_min_c: obs.temperature_min_c,
                    temperature_max_c: obs.temperature_max_c,
                    wind_speed_avg_kmh: obs.wind_speed_avg_kmh,
                    wind_speed_max_kmh: obs.wind_speed_max_kmh,
                    precipitation_total_mm: obs.precipitation_total_mm,
                    cloud_cover_avg_pct: obs.cloud_cover_avg_pct,
                    visibility_avg_m: obs.visibility_avg_m,
                };
            }
        }

        accident.weather_pattern = Some(WeatherPattern { days });
    }

    Ok(())
}
