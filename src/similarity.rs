//! Weather similarity: compares two 7-day weather windows.
//!
//! Returns a score in `[0, 1]`, 1.0
//! meaning the two windows agree pointwise. Missing data degrades
//! gracefully at every level: a missing sub-variable drops out of its
//! category, a missing category drops out of its day, and a missing day
//! drops out of the window average — weights are always renormalized over
//! what's actually present, never silently treated as zero.

use crate::domain::weather::{DailyObservation, VariableStats, WeatherStats};
use crate::domain::WeatherPattern;
use crate::helpers::clamp01;

/// Returned alongside the score so the caller (the aggregator) can mark an
/// accident's weather evidence as thin when fewer than three days have any
/// data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityResult {
    pub score: f64,
    pub low_confidence: bool,
}

/// The neutral result returned whenever a window can't be meaningfully
/// compared (too sparse, or an accident never got weather attached at all).
pub const NEUTRAL_SIMILARITY: f64 = 0.5;
const MIN_DAYS_WITH_DATA: usize = 3;

struct Category {
    weight: f64,
    score: Option<f64>,
}

/// Normalized absolute difference, clipped to `[0,1]` and inverted so
/// identical values score 1.0. A zero or absent standard deviation means the
/// variable has no discriminating power at this location, so any two values
/// compare as a perfect match.
fn variable_score(route_value: Option<f64>, accident_value: Option<f64>, stats: Option<VariableStats>) -> Option<f64> {
    let (r, a) = match (route_value, accident_value) {
        (Some(r), Some(a)) => (r, a),
        _ => return None,
    };
    let std = stats.map(|s| s.std_dev()).unwrap_or(0.0);
    if std <= 0.0 {
        return Some(1.0);
    }
    let normalized = (r - a).abs() / std;
    Some(clamp01(1.0 - normalized))
}

fn weighted_mean(categories: &[Category]) -> Option<f64> {
    let total_weight: f64 = categories.iter().filter_map(|c| c.score.map(|_| c.weight)).sum();
    if total_weight <= 0.0 {
        return None;
    }
    let weighted_sum: f64 = categories.iter().filter_map(|c| c.score.map(|s| s * c.weight)).sum();
    Some(weighted_sum / total_weight)
}

fn day_score(route_day: &DailyObservation, accident_day: &DailyObservation, stats: &WeatherStats) -> Option<f64> {
    let precipitation = variable_score(
        route_day.precipitation_total_mm,
        accident_day.precipitation_total_mm,
        stats.precipitation_total_mm,
    );

    let wind_scores: Vec<f64> = [
        variable_score(route_day.wind_speed_avg_kmh, accident_day.wind_speed_avg_kmh, stats.wind_speed_avg_kmh),
        variable_score(route_day.wind_speed_max_kmh, accident_day.wind_speed_max_kmh, stats.wind_speed_max_kmh),
    ]
    .into_iter()
    .flatten()
    .collect();
    let wind = (!wind_scores.is_empty()).then(|| wind_scores.iter().sum::<f64>() / wind_scores.len() as f64);

    let temperature_scores: Vec<f64> = [
        variable_score(route_day.temperature_avg_c, accident_day.temperature_avg_c, stats.temperature_avg_c),
        variable_score(route_day.temperature_min_c, accident_day.temperature_min_c, stats.temperature_min_c),
        variable_score(route_day.temperature_max_c, accident_day.temperature_max_c, stats.temperature_max_c),
    ]
    .into_iter()
    .flatten()
    .collect();
    let temperature =
        (!temperature_scores.is_empty()).then(|| temperature_scores.iter().sum::<f64>() / temperature_scores.len() as f64);

    let cloud_cover = variable_score(route_day.cloud_cover_avg_pct, accident_day.cloud_cover_avg_pct, stats.cloud_cover_avg_pct);
    let visibility = variable_score(route_day.visibility_avg_m, accident_day.visibility_avg_m, stats.visibility_avg_m);

    weighted_mean(&[
        Category { weight: 0.30, score: precipitation },
        Category { weight: 0.25, score: wind },
        Category { weight: 0.20, score: temperature },
        Category { weight: 0.15, score: cloud_cover },
        Category { weight: 0.10, score: visibility },
    ])
}

/// Compare two weather windows, aligned by relative day offset (index 0 is
/// target-6, index 6 is target, for both patterns).
pub fn weather_similarity(route_pattern: &WeatherPattern, accident_pattern: &WeatherPattern, stats: &WeatherStats) -> SimilarityResult {
    let day_scores: Vec<f64> = route_pattern
        .days
        .iter()
        .zip(accident_pattern.days.iter())
        .filter_map(|(route_day, accident_day)| day_score(route_day, accident_day, stats))
        .collect();

    if day_scores.len() < MIN_DAYS_WITH_DATA {
        return SimilarityResult { score: NEUTRAL_SIMILARITY, low_confidence: true };
    }

    let mean = day_scores.iter().sum::<f64>() / day_scores.len() as f64;
    SimilarityResult { score: clamp01(mean), low_confidence: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with_std(std: f64) -> WeatherStats {
        let v = Some(VariableStats { mean: 0.0, variance: std * std });
        WeatherStats {
            temperature_avg_c: v,
            temperature_min_c: v,
            temperature_max_c: v,
            wind_speed_avg_kmh: v,
            wind_speed_max_kmh: v,
            precipitation_total_mm: v,
            cloud_cover_avg_pct: v,
            visibility_avg_m: v,
        }
    }

    fn full_day(value: f64) -> DailyObservation {
        DailyObservation {
            temperature_avg_c: Some(value),
            temperature_min_c: Some(value),
            temperature_max_c: Some(value),
            wind_speed_avg_kmh: Some(value),
            wind_speed_max_kmh: Some(value),
            precipitation_total_mm: Some(value),
            cloud_cover_avg_pct: Some(value),
            visibility_avg_m: Some(value),
        }
    }

    #[test]
    fn identical_patterns_score_one() {
        let stats = stats_with_std(5.0);
        let pattern = WeatherPattern { days: [full_day(10.0); 7] };
        let result = weather_similarity(&pattern, &pattern, &stats);
        assert!((result.score - 1.0).abs() < 1e-9);
        assert!(!result.low_confidence);
    }

    #[test]
    fn sparse_window_is_neutral_and_low_confidence() {
        let stats = stats_with_std(5.0);
        let mut route = WeatherPattern::neutral();
        let mut accident = WeatherPattern::neutral();
        route.days[6] = full_day(10.0);
        accident.days[6] = full_day(10.0);
        // Only one overlapping day with data -> below MIN_DAYS_WITH_DATA.
        let result = weather_similarity(&route, &accident, &stats);
        assert_eq!(result.score, NEUTRAL_SIMILARITY);
        assert!(result.low_confidence);
    }

    #[test]
    fn large_divergence_scores_low() {
        let stats = stats_with_std(1.0);
        let route = WeatherPattern { days: [full_day(0.0); 7] };
        let accident = WeatherPattern { days: [full_day(50.0); 7] };
        let result = weather_similarity(&route, &accident, &stats);
        assert!(result.score < 0.1, "expected near-zero, got {}", result.score);
    }

    #[test]
    fn zero_std_dev_is_treated_as_perfect_match() {
        let stats = stats_with_std(0.0);
        let route = WeatherPattern { days: [full_day(0.0); 7] };
        let accident = WeatherPattern { days: [full_day(999.0); 7] };
        let result = weather_similarity(&route, &accident, &stats);
        assert!((result.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_variable_renormalizes_remaining_weights() {
        let stats = stats_with_std(1.0);
        let mut route_day = full_day(0.0);
        let mut accident_day = full_day(0.0);
        // Drop precipitation entirely on both sides for every day; the
        // remaining categories should still combine to a perfect match.
        route_day.precipitation_total_mm = None;
        accident_day.precipitation_total_mm = None;
        let route = WeatherPattern { days: [route_day; 7] };
        let accident = WeatherPattern { days: [accident_day; 7] };
        let result = weather_similarity(&route, &accident, &stats);
        assert!((result.score - 1.0).abs() < 1e-9);
    }
}
