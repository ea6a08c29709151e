//! Small numeric helpers shared by the kernels, similarity, and aggregator.
//!
//! The kernels and similarity functions are specified entirely in terms of
//! finite f64 values in known ranges; `nan_to_zero` and `clamp01` exist so
//! that a single call site, rather than every kernel, is responsible for
//! turning a pathological input (NaN, out-of-range) into the documented
//! degraded value instead of propagating it.

/// Replace a non-finite value with 0.0, logging a warning. Used at kernel
/// boundaries: an individual kernel returning NaN is treated as 0 and
/// logged, never propagated as an error.
pub fn nan_to_zero(v: f64, context: &str) -> f64 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("{context} produced non-finite value {v}, treating as 0");
        0.0
    }
}

/// Clamp a value into `[0, 1]`.
pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Great-circle distance between two WGS84 points, in kilometers.
///
/// Standard haversine formula; Earth radius taken as the IUGG mean radius.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
