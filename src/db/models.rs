use chrono::NaiveDate;
use sqlx::FromRow;

/// Raw `accidents` row. `route_type`/`severity` are decoded as plain TEXT
/// rather than a native Postgres enum, then parsed with `FromStr` —
/// simpler to keep in sync with the Rust enums than a `CREATE TYPE` that
/// both the migration and the code have to agree on.
#[derive(Debug, Clone, FromRow)]
pub struct AccidentRow {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_meters: Option<f64>,
    pub accident_date: NaiveDate,
    pub route_type: String,
    pub severity: String,
}

/// Raw `weather_observations` row joined against a batch of accident ids.
/// `idx` is the 1-based `WITH ORDINALITY` position of the accident this row
/// belongs to, used to fold rows back onto the caller's accident list
/// without a second lookup by id.
#[derive(Debug, Clone, FromRow)]
pub struct WeatherObservationRow {
    pub idx: i64,
    pub observation_date: Option<NaiveDate>,
    pub temperature_avg_c: Option<f64>,
    pub temperature_min_c: Option<f64>,
    pub temperature_max_c: Option<f64>,
    pub wind_speed_avg_kmh: Option<f64>,
    pub wind_speed_max_kmh: Option<f64>,
    pub precipitation_total_mm: Option<f64>,
    pub cloud_cover_avg_pct: Option<f64>,
    pub visibility_avg_m: Option<f64>,
}
