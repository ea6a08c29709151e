//! Per-accident influence records and the final prediction response shape.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::accident::{RouteType, Severity};

/// Per-accident scoring breakdown, produced by the influence aggregator.
///
/// `total_influence` is the post-amplifier contribution; accidents below the
/// similarity-exclusion threshold carry `total_influence == 0.0` and are not
/// contributors.
#[derive(Debug, Clone, PartialEq)]
pub struct Influence {
    pub accident_id: i64,
    pub distance_km: f64,
    pub days_elapsed: i64,
    pub spatial_w: f64,
    pub temporal_w: f64,
    pub elevation_w: f64,
    pub route_type_w: f64,
    pub severity_w: f64,
    pub weather_similarity: f64,
    pub total_influence: f64,
    pub severity: Severity,
}

impl Influence {
    pub fn is_contributor(&self) -> bool {
        self.total_influence > 0.0
    }
}

/// Deterministic ordering for the top-contributors list:
/// `total_influence` descending, ties broken by `days_elapsed` ascending,
/// then `distance_km` ascending, then `accident_id` ascending.
pub fn contributor_order(a: &Influence, b: &Influence) -> std::cmp::Ordering {
    b.total_influence
        .partial_cmp(&a.total_influence)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.days_elapsed.cmp(&b.days_elapsed))
        .then_with(|| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .then_with(|| a.accident_id.cmp(&b.accident_id))
}

/// Maximum number of contributors surfaced in a [`Prediction`].
pub const MAX_TOP_CONTRIBUTORS: usize = 10;

/// A single entry in the response's `top_contributing_accidents` list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopContributor {
    pub accident_id: i64,
    pub distance_km: f64,
    pub days_ago: i64,
    pub total_influence: f64,
    pub severity: Severity,
}

impl From<&Influence> for TopContributor {
    fn from(inf: &Influence) -> Self {
        TopContributor {
            accident_id: inf.accident_id,
            distance_km: round2(inf.distance_km),
            days_ago: inf.days_elapsed,
            total_influence: round2(inf.total_influence),
            severity: inf.severity,
        }
    }
}

/// Response metadata block.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PredictionMetadata {
    pub route_type: RouteType,
    pub target_date: NaiveDate,
    pub vectorized: bool,
    /// Set when any input (weather, elevation) fell back to a degraded
    /// substitute rather than aborting the request.
    pub degraded: bool,
}

/// The final prediction response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Prediction {
    pub risk_score: f64,
    pub confidence: f64,
    pub num_contributing_accidents: usize,
    pub top_contributing_accidents: Vec<TopContributor>,
    pub metadata: PredictionMetadata,
}

/// Round to two decimal places, as required at the response boundary.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inf(id: i64, total: f64, days: i64, dist: f64) -> Influence {
        Influence {
            accident_id: id,
            distance_km: dist,
            days_elapsed: days,
            spatial_w: 1.0,
            temporal_w: 1.0,
            elevation_w: 1.0,
            route_type_w: 1.0,
            severity_w: 1.0,
            weather_similarity: 1.0,
            total_influence: total,
            severity: Severity::Unknown,
        }
    }

    #[test]
    fn ordering_prefers_higher_total_influence() {
        let a = inf(1, 2.0, 10, 5.0);
        let b = inf(2, 1.0, 10, 5.0);
        assert_eq!(contributor_order(&a, &b), std::cmp::Ordering::Less);
    }

    #[test]
    fn ties_break_by_days_elapsed_then_distance_then_id() {
        let a = inf(1, 1.0, 5, 10.0);
        let b = inf(2, 1.0, 5, 5.0);
        // equal total and days — break on distance
        assert_eq!(contributor_order(&a, &b), std::cmp::Ordering::Greater);

        let c = inf(1, 1.0, 3, 10.0);
        let d = inf(2, 1.0, 7, 10.0);
        assert_eq!(contributor_order(&c, &d), std::cmp::Ordering::Less);

        let e = inf(5, 1.0, 3, 10.0);
        let f = inf(2, 1.0, 3, 10.0);
        assert_eq!(contributor_order(&e, &f), std::cmp::Ordering::Greater);
    }

    #[test]
    fn round2_matches_boundary_contract() {
        assert_eq!(round2(12.345), 12.35);
        assert_eq!(round2(0.0), 0.0);
    }
}
