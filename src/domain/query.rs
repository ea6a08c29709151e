//! The inbound prediction request payload and its validation.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use super::accident::RouteType;
use crate::errors::AppError;

/// Minimum/maximum accepted `search_radius_km`. Accepted but
/// unused by the candidate filter, which is pinned at
/// [`crate::kernels::LOCAL_RADIUS_KM`].
pub const SEARCH_RADIUS_MIN_KM: f64 = 10.0;
pub const SEARCH_RADIUS_MAX_KM: f64 = 500.0;
pub const SEARCH_RADIUS_DEFAULT_KM: f64 = 50.0;

/// A single field-level validation failure.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Raw JSON body of `POST /api/v1/predict`, before validation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RouteQueryInput {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_meters: Option<f64>,
    pub route_type: String,
    pub target_date: String,
    pub search_radius_km: Option<f64>,
}

/// A validated prediction request. Only ever constructed via [`RouteQuery::validate`].
#[derive(Debug, Clone)]
pub struct RouteQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_meters: Option<f64>,
    pub route_type: RouteType,
    pub target_date: NaiveDate,
    pub search_radius_km: f64,
}

impl RouteQuery {
    /// Validate a raw request, collecting every field-level error rather
    /// than failing fast, so the 422 response can list them all at once.
    pub fn validate(input: RouteQueryInput, today: NaiveDate) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        if !(-90.0..=90.0).contains(&input.latitude) {
            errors.push(FieldError {
                field: "latitude".into(),
                message: "must be between -90 and 90".into(),
            });
        }
        if !(-180.0..=180.0).contains(&input.longitude) {
            errors.push(FieldError {
                field: "longitude".into(),
                message: "must be between -180 and 180".into(),
            });
        }

        let route_type = input.route_type.parse::<RouteType>().map_err(|_| ()).ok();
        if route_type.is_none() {
            errors.push(FieldError {
                field: "route_type".into(),
                message: format!("unrecognized route_type '{}'", input.route_type),
            });
        }

        let target_date = NaiveDate::parse_from_str(&input.target_date, "%Y-%m-%d").ok();
        match target_date {
            None => errors.push(FieldError {
                field: "target_date".into(),
                message: "must be an ISO 8601 date (YYYY-MM-DD)".into(),
            }),
            Some(d) => {
                let max_date = today + chrono::Duration::days(6);
                if d < today || d > max_date {
                    errors.push(FieldError {
                        field: "target_date".into(),
                        message: format!(
                            "must be between {today} and {max_date} for forecast-backed predictions"
                        ),
                    });
                }
            }
        }

        let search_radius_km = match input.search_radius_km {
            None => SEARCH_RADIUS_DEFAULT_KM,
            Some(r) => {
                if !(SEARCH_RADIUS_MIN_KM..=SEARCH_RADIUS_MAX_KM).contains(&r) {
                    errors.push(FieldError {
                        field: "search_radius_km".into(),
                        message: format!(
                            "must be between {SEARCH_RADIUS_MIN_KM} and {SEARCH_RADIUS_MAX_KM}"
                        ),
                    });
                    SEARCH_RADIUS_DEFAULT_KM
                } else {
                    r
                }
            }
        };

        if !errors.is_empty() {
            return Err(AppError::InvalidInput(errors));
        }

        Ok(RouteQuery {
            latitude: input.latitude,
            longitude: input.longitude,
            elevation_meters: input.elevation_meters,
            route_type: route_type.expect("validated above"),
            target_date: target_date.expect("validated above"),
            search_radius_km,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> RouteQueryInput {
        RouteQueryInput {
            latitude: 40.255,
            longitude: -105.615,
            elevation_meters: Some(4346.0),
            route_type: "alpine".into(),
            target_date: "2026-07-15".into(),
            search_radius_km: None,
        }
    }

    #[test]
    fn valid_query_passes() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 12).unwrap();
        let q = RouteQuery::validate(base_input(), today).unwrap();
        assert_eq!(q.route_type, RouteType::Alpine);
        assert_eq!(q.search_radius_km, SEARCH_RADIUS_DEFAULT_KM);
    }

    #[test]
    fn out_of_range_latitude_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 12).unwrap();
        let mut input = base_input();
        input.latitude = 95.0;
        let err = RouteQuery::validate(input, today).unwrap_err();
        match err {
            AppError::InvalidInput(fields) => {
                assert!(fields.iter().any(|f| f.field == "latitude"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn target_date_outside_forecast_window_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 12).unwrap();
        let mut input = base_input();
        input.target_date = "2026-08-01".into();
        let err = RouteQuery::validate(input, today).unwrap_err();
        match err {
            AppError::InvalidInput(fields) => {
                assert!(fields.iter().any(|f| f.field == "target_date"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn search_radius_out_of_bounds_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 12).unwrap();
        let mut input = base_input();
        input.search_radius_km = Some(5.0);
        let err = RouteQuery::validate(input, today).unwrap_err();
        match err {
            AppError::InvalidInput(fields) => {
                assert!(fields.iter().any(|f| f.field == "search_radius_km"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn multiple_errors_are_all_reported() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 12).unwrap();
        let mut input = base_input();
        input.latitude = 200.0;
        input.route_type = "wingsuit".into();
        let err = RouteQuery::validate(input, today).unwrap_err();
        match err {
            AppError::InvalidInput(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }
}
