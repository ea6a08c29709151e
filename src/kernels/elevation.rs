//! Elevation (asymmetric) kernel.

use crate::domain::accident::RouteType;

/// Per-route-type elevation decay constant `D` (meters). Larger values mean
/// the kernel is more tolerant of elevation differences.
pub fn elevation_decay_m(route_type: RouteType) -> f64 {
    match route_type {
        RouteType::Alpine | RouteType::Ice | RouteType::Mixed => 800.0,
        RouteType::Trad | RouteType::Aid => 1200.0,
        RouteType::Sport => 1800.0,
        RouteType::Boulder => 3000.0,
        RouteType::Unknown => 1200.0,
    }
}

/// `w_elev` is asymmetric: an accident *at or below* the queried route's
/// elevation counts fully (conditions lower on the mountain still apply to
/// everything above), while one *above* it decays — altitude-specific
/// hazards (exposure, cornices, thin air) don't project downward onto a
/// lower route. Missing elevation on either side is treated as neutral
/// (weight 1.0); the caller never has enough information to penalize it.
pub fn w_elev(route_elevation_m: Option<f64>, accident_elevation_m: Option<f64>, route_type: RouteType) -> f64 {
    let (route_elev, accident_elev) = match (route_elevation_m, accident_elevation_m) {
        (Some(r), Some(a)) => (r, a),
        _ => return 1.0,
    };

    let delta = accident_elev - route_elev;
    if delta <= 0.0 {
        1.0
    } else {
        let d = elevation_decay_m(route_type);
        (-(delta / d).powi(2)).exp()
    }
}
