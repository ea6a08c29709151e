//! A 7-day weather window and the daily observations that make it up.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of days in a weather window (target day and the six preceding it).
pub const WINDOW_DAYS: usize = 7;

/// Meteorological season bucket for a date, used as part of the
/// climatological-statistics cache key (`stats:{elev}:{season}`).
/// Northern-hemisphere convention; good enough as a cache partitioning key
/// rather than a scientifically precise season boundary.
pub fn season_label(date: NaiveDate) -> &'static str {
    match date.month() {
        12 | 1 | 2 => "winter",
        3 | 4 | 5 => "spring",
        6 | 7 | 8 => "summer",
        9 | 10 | 11 => "autumn",
        _ => unreachable!("NaiveDate::month() is always 1..=12"),
    }
}

/// A single day's weather observation. All fields are optional: missing
/// values are permitted and treated as neutral by [`crate::similarity`].
///
/// Field order is part of the wire contract — it must not change, so that
/// two equal `WeatherPattern` values serialize to identical bytes (needed
/// for cache values to round-trip byte-for-byte).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DailyObservation {
    pub temperature_avg_c: Option<f64>,
    pub temperature_min_c: Option<f64>,
    pub temperature_max_c: Option<f64>,
    pub wind_speed_avg_kmh: Option<f64>,
    pub wind_speed_max_kmh: Option<f64>,
    pub precipitation_total_mm: Option<f64>,
    pub cloud_cover_avg_pct: Option<f64>,
    pub visibility_avg_m: Option<f64>,
}

impl DailyObservation {
    /// A day with every field absent.
    pub const fn neutral() -> Self {
        Self {
            temperature_avg_c: None,
            temperature_min_c: None,
            temperature_max_c: None,
            wind_speed_avg_kmh: None,
            wind_speed_max_kmh: None,
            precipitation_total_mm: None,
            cloud_cover_avg_pct: None,
            visibility_avg_m: None,
        }
    }

    /// True if every field is missing.
    pub fn is_empty(&self) -> bool {
        self.temperature_avg_c.is_none()
            && self.temperature_min_c.is_none()
            && self.temperature_max_c.is_none()
            && self.wind_speed_avg_kmh.is_none()
            && self.wind_speed_max_kmh.is_none()
            && self.precipitation_total_mm.is_none()
            && self.cloud_cover_avg_pct.is_none()
            && self.visibility_avg_m.is_none()
    }
}

/// A 7-day window of daily observations, index 0 = target-6 .. index 6 = target.
///
/// Invariant: `days.len() == WINDOW_DAYS` always — gaps are represented by
/// [`DailyObservation::neutral`] entries, never by a shorter vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPattern {
    pub days: [DailyObservation; WINDOW_DAYS],
}

impl WeatherPattern {
    /// The [`Neutral weather pattern`] glossary entry: every variable absent.
    pub fn neutral() -> Self {
        Self {
            days: [DailyObservation::neutral(); WINDOW_DAYS],
        }
    }

    /// Number of days that carry at least one observed field.
    pub fn days_with_data(&self) -> usize {
        self.days.iter().filter(|d| !d.is_empty()).count()
    }
}

/// Climatological mean/variance per variable for a location, elevation
/// bucket, and season — the denominator [`crate::similarity`] normalizes
/// against when comparing a historical accident's weather to the route's.
///
/// One field pair per [`DailyObservation`] field; `None` means the provider
/// had no samples for that variable at this location/season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct WeatherStats {
    pub temperature_avg_c: Option<VariableStats>,
    pub temperature_min_c: Option<VariableStats>,
    pub temperature_max_c: Option<VariableStats>,
    pub wind_speed_avg_kmh: Option<VariableStats>,
    pub wind_speed_max_kmh: Option<VariableStats>,
    pub precipitation_total_mm: Option<VariableStats>,
    pub cloud_cover_avg_pct: Option<VariableStats>,
    pub visibility_avg_m: Option<VariableStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableStats {
    pub mean: f64,
    pub variance: f64,
}

impl VariableStats {
    pub fn std_dev(&self) -> f64 {
        self.variance.max(0.0).sqrt()
    }
}
