//! Route types, severities, and the per-accident record used for scoring.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::weather::WeatherPattern;

/// A discipline a route (or an accident) was climbed under.
///
/// Closed enum — an `unknown` variant absorbs anything the
/// accident source didn't classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    Alpine,
    Ice,
    Mixed,
    Trad,
    Aid,
    Sport,
    Boulder,
    Unknown,
}

/// All route types, in the fixed order used to index the route-type matrix.
pub const ALL_ROUTE_TYPES: [RouteType; 8] = [
    RouteType::Alpine,
    RouteType::Ice,
    RouteType::Mixed,
    RouteType::Trad,
    RouteType::Aid,
    RouteType::Sport,
    RouteType::Boulder,
    RouteType::Unknown,
];

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::Alpine => "alpine",
            RouteType::Ice => "ice",
            RouteType::Mixed => "mixed",
            RouteType::Trad => "trad",
            RouteType::Aid => "aid",
            RouteType::Sport => "sport",
            RouteType::Boulder => "boulder",
            RouteType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RouteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alpine" => Ok(RouteType::Alpine),
            "ice" => Ok(RouteType::Ice),
            "mixed" => Ok(RouteType::Mixed),
            "trad" => Ok(RouteType::Trad),
            "aid" => Ok(RouteType::Aid),
            "sport" => Ok(RouteType::Sport),
            "boulder" => Ok(RouteType::Boulder),
            "unknown" => Ok(RouteType::Unknown),
            other => Err(format!("unrecognized route_type '{other}'")),
        }
    }
}

/// Accident severity, ordered roughly from worst to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Serious,
    Moderate,
    Minor,
    Unknown,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Serious => "serious",
            Severity::Moderate => "moderate",
            Severity::Minor => "minor",
            Severity::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fatal" => Ok(Severity::Fatal),
            "serious" => Ok(Severity::Serious),
            "moderate" => Ok(Severity::Moderate),
            "minor" => Ok(Severity::Minor),
            "unknown" => Ok(Severity::Unknown),
            other => Err(format!("unrecognized severity '{other}'")),
        }
    }
}

/// An immutable historical accident record, scoped to a single request.
///
/// `weather_pattern` starts `None` when loaded from `accidents` via
/// `load_all` and is populated in-place by `attach_weather_windows`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccidentRecord {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_meters: Option<f64>,
    pub accident_date: NaiveDate,
    pub route_type: RouteType,
    pub severity: Severity,
    pub weather_pattern: Option<WeatherPattern>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn route_type_round_trips_through_str() {
        for rt in ALL_ROUTE_TYPES {
            let parsed = RouteType::from_str(rt.as_str()).unwrap();
            assert_eq!(parsed, rt);
        }
    }

    #[test]
    fn severity_round_trips_through_str() {
        for sv in [
            Severity::Fatal,
            Severity::Serious,
            Severity::Moderate,
            Severity::Minor,
            Severity::Unknown,
        ] {
            let parsed = Severity::from_str(sv.as_str()).unwrap();
            assert_eq!(parsed, sv);
        }
    }

    #[test]
    fn unrecognized_route_type_is_an_error() {
        assert!(RouteType::from_str("wingsuit").is_err());
    }
}
