//! Route-type compatibility matrix.
//!
//! Committed as data (`config/route_type_matrix.toml`) rather than match
//! arms: the table needs to be re-tunable without a code change, and
//! validating it once at startup is cheaper than re-deriving confidence
//! in eight match arms on every review.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::accident::{RouteType, ALL_ROUTE_TYPES};

/// Bytes for the matrix shipped with the binary. Deployments that want a
/// different table pass an explicit path to [`RouteTypeMatrix::load_from_path`]
/// instead.
const DEFAULT_MATRIX_TOML: &str = include_str!("../../config/route_type_matrix.toml");

#[derive(Debug, Deserialize)]
struct RawMatrix {
    matrix: HashMap<String, HashMap<String, f64>>,
}

/// A validated `planned -> accident -> weight` lookup table.
#[derive(Debug, Clone)]
pub struct RouteTypeMatrix {
    weights: HashMap<(RouteType, RouteType), f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("failed to parse route type matrix: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read route type matrix file: {0}")]
    Io(#[from] std::io::Error),
    #[error("route type matrix missing entry for planned={planned} accident={accident}")]
    MissingEntry { planned: String, accident: String },
    #[error("route type matrix entry out of range [0,1]: planned={planned} accident={accident} value={value}")]
    OutOfRange { planned: String, accident: String, value: f64 },
    #[error("route type matrix failed validation: {0}")]
    Constraint(String),
}

impl RouteTypeMatrix {
    /// Load and validate the matrix embedded in the binary.
    pub fn load_default() -> Result<Self, MatrixError> {
        Self::load_from_str(DEFAULT_MATRIX_TOML)
    }

    /// Load and validate a matrix from an on-disk TOML file.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, MatrixError> {
        let text = std::fs::read_to_string(path)?;
        Self::load_from_str(&text)
    }

    fn load_from_str(text: &str) -> Result<Self, MatrixError> {
        let raw: RawMatrix = toml::from_str(text)?;
        let mut weights = HashMap::new();

        for planned in ALL_ROUTE_TYPES {
            let row = raw.matrix.get(planned.as_str()).ok_or_else(|| MatrixError::MissingEntry {
                planned: planned.as_str().to_string(),
                accident: "*".to_string(),
            })?;
            for accident in ALL_ROUTE_TYPES {
                let value = *row.get(accident.as_str()).ok_or_else(|| MatrixError::MissingEntry {
                    planned: planned.as_str().to_string(),
                    accident: accident.as_str().to_string(),
                })?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(MatrixError::OutOfRange {
                        planned: planned.as_str().to_string(),
                        accident: accident.as_str().to_string(),
                        value,
                    });
                }
                weights.insert((planned, accident), value);
            }
        }

        let matrix = Self { weights };
        matrix.validate_constraints()?;
        Ok(matrix)
    }

    fn validate_constraints(&self) -> Result<(), MatrixError> {
        for rt in ALL_ROUTE_TYPES {
            let identity = self.lookup(rt, rt);
            if (identity - 1.0).abs() > 1e-9 {
                return Err(MatrixError::Constraint(format!("identity entry for {} is {identity}, expected 1.0", rt.as_str())));
            }
        }

        let ice_alpine = self.lookup(RouteType::Ice, RouteType::Alpine);
        if (ice_alpine - 0.95).abs() > 1e-9 {
            return Err(MatrixError::Constraint(format!("ice<->alpine expected 0.95, got {ice_alpine}")));
        }
        let alpine_ice = self.lookup(RouteType::Alpine, RouteType::Ice);
        if (alpine_ice - 0.95).abs() > 1e-9 {
            return Err(MatrixError::Constraint(format!("alpine<->ice expected 0.95, got {alpine_ice}")));
        }

        let alpine_mixed = self.lookup(RouteType::Alpine, RouteType::Mixed);
        if (alpine_mixed - 0.9).abs() > 1e-9 {
            return Err(MatrixError::Constraint(format!("alpine<->mixed expected 0.9, got {alpine_mixed}")));
        }

        // The "canary effect": an alpine route treats a sport-climbing
        // accident as a strong signal (sport crags sit low and see trouble
        // first), but not vice versa.
        let alpine_sport = self.lookup(RouteType::Alpine, RouteType::Sport);
        if (alpine_sport - 0.9).abs() > 1e-9 {
            return Err(MatrixError::Constraint(format!("alpine(planned)->sport(accident) expected 0.9, got {alpine_sport}")));
        }
        let sport_alpine = self.lookup(RouteType::Sport, RouteType::Alpine);
        if sport_alpine >= alpine_sport {
            return Err(MatrixError::Constraint(
                "sport(planned)->alpine(accident) must be strictly less than the reverse".to_string(),
            ));
        }

        for rt in ALL_ROUTE_TYPES {
            if rt == RouteType::Boulder {
                continue;
            }
            let to_boulder = self.lookup(rt, RouteType::Boulder);
            let from_boulder = self.lookup(RouteType::Boulder, rt);
            if to_boulder > 0.3 || from_boulder > 0.3 {
                return Err(MatrixError::Constraint(format!(
                    "boulder<->{} must both be <= 0.3, got {to_boulder} and {from_boulder}",
                    rt.as_str()
                )));
            }
        }

        Ok(())
    }

    /// Weight of an accident on `accident_type` terrain informing a route
    /// planned as `planned_type`. Panics only if the matrix was constructed
    /// bypassing validation, which the public API does not allow.
    pub fn lookup(&self, planned_type: RouteType, accident_type: RouteType) -> f64 {
        *self
            .weights
            .get(&(planned_type, accident_type))
            .expect("validated matrix has an entry for every route type pair")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matrix_loads_and_validates() {
        let m = RouteTypeMatrix::load_default().expect("default matrix must validate");
        assert_eq!(m.lookup(RouteType::Alpine, RouteType::Alpine), 1.0);
    }

    #[test]
    fn identity_is_one_for_every_type() {
        let m = RouteTypeMatrix::load_default().unwrap();
        for rt in ALL_ROUTE_TYPES {
            assert_eq!(m.lookup(rt, rt), 1.0);
        }
    }

    #[test]
    fn canary_effect_is_asymmetric() {
        let m = RouteTypeMatrix::load_default().unwrap();
        let alpine_sport = m.lookup(RouteType::Alpine, RouteType::Sport);
        let sport_alpine = m.lookup(RouteType::Sport, RouteType::Alpine);
        assert!(alpine_sport > sport_alpine);
    }

    #[test]
    fn boulder_is_mostly_isolated() {
        let m = RouteTypeMatrix::load_default().unwrap();
        for rt in ALL_ROUTE_TYPES {
            if rt == RouteType::Boulder {
                continue;
            }
            assert!(m.lookup(rt, RouteType::Boulder) <= 0.3);
            assert!(m.lookup(RouteType::Boulder, rt) <= 0.3);
        }
    }

    #[test]
    fn rejects_matrix_missing_entries() {
        let broken = "[matrix.alpine]\nalpine = 1.0\n";
        let err = RouteTypeMatrix::load_from_str(broken).unwrap_err();
        assert!(matches!(err, MatrixError::MissingEntry { .. }));
    }

    #[test]
    fn rejects_matrix_violating_canary_constraint() {
        let mut text = DEFAULT_MATRIX_TOML.replace("sport = 0.9", "sport = 0.9");
        // Flip the asymmetry: make sport->alpine equal to alpine->sport.
        text = text.replacen("[matrix.sport]\nalpine = 0.3", "[matrix.sport]\nalpine = 0.9", 1);
        let err = RouteTypeMatrix::load_from_str(&text).unwrap_err();
        assert!(matches!(err, MatrixError::Constraint(_)));
    }
}
