//! Spatial (Gaussian) kernel.

use crate::domain::accident::RouteType;

/// Gaussian bandwidth `σ` (km), indexed by the route type the *route* (not
/// the accident) is planned as. This is the single source of truth for
/// spatial decay — nothing else in the crate should hard-code a bandwidth.
pub fn spatial_bandwidth_km(route_type: RouteType) -> f64 {
    match route_type {
        RouteType::Alpine | RouteType::Ice | RouteType::Mixed => 75.0,
        RouteType::Trad | RouteType::Aid => 50.0,
        RouteType::Sport => 30.0,
        RouteType::Boulder => 20.0,
        RouteType::Unknown => 50.0,
    }
}

/// `w_space = exp(-d^2 / (2 * sigma^2))`.
pub fn w_space(distance_km: f64, route_type: RouteType) -> f64 {
    let sigma = spatial_bandwidth_km(route_type);
    (-(distance_km * distance_km) / (2.0 * sigma * sigma)).exp()
}
