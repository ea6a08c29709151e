//! Weight kernels: the five per-accident weighting functions — spatial,
//! temporal, elevation, route-type, severity — plus the tunables that
//! parameterize them and the rest of the scoring pipeline.

pub mod elevation;
pub mod route_matrix;
pub mod severity;
pub mod spatial;
pub mod temporal;

pub use route_matrix::{MatrixError, RouteTypeMatrix};

use std::path::Path;

/// Candidate accidents further than this are excluded outright unless the
/// route-type matrix says they're a strong enough match.
pub const LOCAL_RADIUS_KM: f64 = 50.0;

/// Route-type matrix lookup at or above this threshold pulls in an accident
/// regardless of distance, up to the absolute cutoff enforced elsewhere.
pub const STRICT_ROUTE_TYPE_THRESHOLD: f64 = 0.85;

/// Below this weather-similarity score, an accident's weather contribution
/// is excluded from the composite rather than merely down-weighted.
pub const SIMILARITY_EXCLUSION_THRESHOLD: f64 = 0.25;

/// Exponent applied to the weather similarity term in the composite weight.
pub const WEATHER_POWER: i32 = 2;

const DEFAULT_NORMALIZATION_K: f64 = 10.0;
const NORMALIZATION_K_ENV_VAR: &str = "SAFEASCENT_NORMALIZATION_K";
const AGGREGATOR_MODE_ENV_VAR: &str = "SAFEASCENT_AGGREGATOR_MODE";

/// Which influence aggregator implementation is live for a given
/// process. Both must agree to within 1e-6 on the same inputs;
/// this only picks which one actually runs requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorMode {
    Scalar,
    Vectorized,
}

/// All the named constants and tables the kernels and aggregator draw on, in
/// one place so a reviewer can audit every tunable without hunting
/// through the pipeline.
#[derive(Debug, Clone)]
pub struct PredictionConfig {
    pub route_type_matrix: RouteTypeMatrix,
    pub local_radius_km: f64,
    pub strict_route_type_threshold: f64,
    pub similarity_exclusion_threshold: f64,
    pub weather_power: i32,
    /// Normalization constant `K` in the risk-score formula
    /// `risk_score = min(100, max(0, raw * K))`. Defaults to 10.0;
    /// overridable via `SAFEASCENT_NORMALIZATION_K` for deployments that
    /// want a different sensitivity curve without a rebuild.
    pub normalization_k: f64,
    /// Which aggregator implementation the orchestrator calls into. The
    /// vectorized path is mandatory for production traffic; scalar is kept
    /// selectable for debugging a discrepancy against it.
    pub aggregator_mode: AggregatorMode,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error("{} must be a positive finite number, got '{1}'", NORMALIZATION_K_ENV_VAR)]
    InvalidNormalizationK(String),
    #[error("{} must be 'scalar' or 'vectorized', got '{1}'", AGGREGATOR_MODE_ENV_VAR)]
    InvalidAggregatorMode(String),
}

impl PredictionConfig {
    /// Load the embedded default route-type matrix and environment-derived
    /// tunables. This is what `main.rs` calls at startup.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_matrix(RouteTypeMatrix::load_default()?)
    }

    /// Load a route-type matrix from an explicit path instead of the
    /// binary-embedded default, e.g. for a deployment that wants to re-tune
    /// the matrix without a rebuild.
    pub fn load_with_matrix_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_matrix(RouteTypeMatrix::load_from_path(path)?)
    }

    fn from_matrix(route_type_matrix: RouteTypeMatrix) -> Result<Self, ConfigError> {
        let normalization_k = match std::env::var(NORMALIZATION_K_ENV_VAR) {
            Ok(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or(ConfigError::InvalidNormalizationK(raw))?,
            Err(_) => DEFAULT_NORMALIZATION_K,
        };

        let aggregator_mode = match std::env::var(AGGREGATOR_MODE_ENV_VAR) {
            Ok(raw) if raw.eq_ignore_ascii_case("scalar") => AggregatorMode::Scalar,
            Ok(raw) if raw.eq_ignore_ascii_case("vectorized") => AggregatorMode::Vectorized,
            Ok(other) => return Err(ConfigError::InvalidAggregatorMode(other)),
            Err(_) => AggregatorMode::Vectorized,
        };

        Ok(Self {
            route_type_matrix,
            local_radius_km: LOCAL_RADIUS_KM,
            strict_route_type_threshold: STRICT_ROUTE_TYPE_THRESHOLD,
            similarity_exclusion_threshold: SIMILARITY_EXCLUSION_THRESHOLD,
            weather_power: WEATHER_POWER,
            normalization_k,
            aggregator_mode,
        })
    }

    /// A config instance for tests that doesn't touch the environment.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            route_type_matrix: RouteTypeMatrix::load_default().expect("default matrix is valid"),
            local_radius_km: LOCAL_RADIUS_KM,
            strict_route_type_threshold: STRICT_ROUTE_TYPE_THRESHOLD,
            similarity_exclusion_threshold: SIMILARITY_EXCLUSION_THRESHOLD,
            weather_power: WEATHER_POWER,
            normalization_k: DEFAULT_NORMALIZATION_K,
            aggregator_mode: AggregatorMode::Vectorized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_succeeds_with_default_matrix() {
        // Avoid racing other tests that set SAFEASCENT_NORMALIZATION_K.
        let cfg = PredictionConfig::for_tests();
        assert_eq!(cfg.normalization_k, DEFAULT_NORMALIZATION_K);
        assert_eq!(cfg.local_radius_km, 50.0);
        assert_eq!(cfg.strict_route_type_threshold, 0.85);
        assert_eq!(cfg.similarity_exclusion_threshold, 0.25);
        assert_eq!(cfg.weather_power, 2);
    }
}
