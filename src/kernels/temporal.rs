//! Temporal (exponential decay + seasonal boost) kernel.

use chrono::NaiveDate;

use crate::domain::accident::RouteType;

/// Per-route-type exponential decay base `lambda`. `w_time` raises this to
/// `days_elapsed`, so values close to 1.0 decay slowly.
pub fn temporal_decay_base(route_type: RouteType) -> f64 {
    match route_type {
        RouteType::Alpine | RouteType::Ice | RouteType::Mixed => 0.9995,
        RouteType::Trad | RouteType::Aid | RouteType::Sport => 0.9990,
        RouteType::Boulder => 0.9985,
        RouteType::Unknown => 0.9990,
    }
}

/// Boost applied when the accident's calendar month and the target date's
/// calendar month are the same or adjacent (modular, so December/January
/// count as adjacent). Fixed at 1.5x.
const SEASONAL_BOOST: f64 = 1.5;

fn months_apart(a: u32, b: u32) -> u32 {
    let diff = (a as i32 - b as i32).unsigned_abs();
    diff.min(12 - diff)
}

/// `w_time = lambda^days_elapsed * seasonal_boost`, where `days_elapsed` is
/// `target_date - accident_date` in days clamped to `>= 0` (an accident
/// dated after the target date is bad data, not a time machine — it gets
/// the maximal temporal weight rather than being penalized as if it were
/// equally far in the past), and the seasonal boost applies when the two
/// dates fall within one month of each other on the calendar (ignoring year).
pub fn w_time(accident_date: NaiveDate, target_date: NaiveDate, route_type: RouteType) -> f64 {
    let days_elapsed = (target_date - accident_date).num_days().max(0);
    let lambda = temporal_decay_base(route_type);
    let base = lambda.powf(days_elapsed as f64);

    let seasonal = if months_apart(accident_date.month(), target_date.month()) <= 1 {
        SEASONAL_BOOST
    } else {
        1.0
    };

    base * seasonal
}

use chrono::Datelike;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_day_same_season_is_full_weight_times_boost() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let w = w_time(d, d, RouteType::Alpine);
        assert!((w - SEASONAL_BOOST).abs() < 1e-9);
    }

    #[test]
    fn weight_decays_with_elapsed_days() {
        let accident = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let near = NaiveDate::from_ymd_opt(2025, 1, 16).unwrap();
        let far = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let w_near = w_time(accident, near, RouteType::Sport);
        let w_far = w_time(accident, far, RouteType::Sport);
        assert!(w_near > w_far);
    }

    #[test]
    fn seasonal_boost_applies_across_year_boundary() {
        let accident = NaiveDate::from_ymd_opt(2020, 12, 20).unwrap();
        let target = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert_eq!(months_apart(12, 1), 1);
        let w = w_time(accident, target, RouteType::Alpine);
        let base = temporal_decay_base(RouteType::Alpine).powf(
            (target - accident).num_days().max(0) as f64,
        );
        assert!((w - base * SEASONAL_BOOST).abs() < 1e-9);
    }

    #[test]
    fn accident_dated_after_target_clamps_to_zero_elapsed_days() {
        // Bad data: accident_date after target_date. Spec clamps
        // days_elapsed to >= 0 rather than treating it as a large
        // magnitude of elapsed time in either direction.
        let accident = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let target = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let w = w_time(accident, target, RouteType::Alpine);
        // days_elapsed clamps to 0, so this is the same as same-day-same-season.
        assert!((w - SEASONAL_BOOST).abs() < 1e-9);
    }

    #[test]
    fn no_boost_for_off_season_dates() {
        let accident = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let target = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let w = w_time(accident, target, RouteType::Alpine);
        let base = temporal_decay_base(RouteType::Alpine).powf(
            (target - accident).num_days().max(0) as f64,
        );
        assert!((w - base).abs() < 1e-9);
    }
}
