// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Canonical Parameters
// ─────────────────────────────────────────────────────────────────────
//! Contract constants shared with every other implementation of the
//! engine: the field clamps, the CFL limit and the dimension-indexed
//! CFL-factor table. Cross-implementation comparisons depend on these
//! values, so they must not drift.

use pof_types::{PofError, PofResult};

pub use pof_types::{DEFAULT_ENERGY_CLAMP as ENERGY_CLAMP, DEFAULT_FIELD_MAX as FIELD_MAX};

/// Largest admissible `c·dt/min(dx)` for the explicit leapfrog scheme.
pub const CFL_LIMIT: f64 = 1.0;

/// CFL safety-factor ranges, indexed by dimension class:
/// `[≤2, 3, ≥4]`.
pub const CFL_FACTOR_TABLE: [(f64, f64); 3] = [
    (0.4, 0.6), // dimension ≤ 2
    (0.3, 0.5), // dimension 3
    (0.2, 0.4), // dimension ≥ 4
];

/// Midpoint of each range, used when no factor is configured.
pub const DEFAULT_CFL_FACTOR: [f64; 3] = [0.5, 0.4, 0.3];

/// Numerical-dissipation multiplier on `γ_eff` for the stabilized scheme.
pub const DISSIPATION_FACTOR: [f64; 3] = [1.0, 1.5, 2.0];

fn dimension_class(dimension: usize) -> usize {
    match dimension {
        0..=2 => 0,
        3 => 1,
        _ => 2,
    }
}

/// Admissible `cfl_factor` range for a dimension.
pub fn cfl_factor_range(dimension: usize) -> (f64, f64) {
    CFL_FACTOR_TABLE[dimension_class(dimension)]
}

pub fn default_cfl_factor(dimension: usize) -> f64 {
    DEFAULT_CFL_FACTOR[dimension_class(dimension)]
}

pub fn dissipation_factor(dimension: usize) -> f64 {
    DISSIPATION_FACTOR[dimension_class(dimension)]
}

/// Courant number `c·dt/min(dx)`.
#[inline]
pub fn cfl_number(wave_speed: f64, dt: f64, min_dx: f64) -> f64 {
    wave_speed * dt / min_dx
}

/// Adaptive time step `clamp(cfl_factor · min(dx) / c, dt_min, dt_max)`.
///
/// A configured factor outside the dimension's range is rejected.
pub fn adaptive_dt(
    dimension: usize,
    cfl_factor: Option<f64>,
    min_dx: f64,
    wave_speed: f64,
    dt_min: f64,
    dt_max: f64,
) -> PofResult<f64> {
    let (lo, hi) = cfl_factor_range(dimension);
    let factor = match cfl_factor {
        Some(f) if f < lo || f > hi => {
            return Err(PofError::Configuration(format!(
                "cfl_factor {f} outside [{lo}, {hi}] for dimension {dimension}"
            )));
        }
        Some(f) => f,
        None => default_cfl_factor(dimension),
    };
    Ok((factor * min_dx / wave_speed).clamp(dt_min, dt_max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_clamps() {
        assert_eq!(FIELD_MAX, 1000.0);
        assert_eq!(ENERGY_CLAMP, 100.0);
    }

    #[test]
    fn test_cfl_table_verbatim() {
        assert_eq!(cfl_factor_range(1), (0.4, 0.6));
        assert_eq!(cfl_factor_range(2), (0.4, 0.6));
        assert_eq!(cfl_factor_range(3), (0.3, 0.5));
        assert_eq!(cfl_factor_range(4), (0.2, 0.4));
        assert_eq!(cfl_factor_range(5), (0.2, 0.4));
    }

    #[test]
    fn test_default_factor_inside_range() {
        for d in 1..=5 {
            let (lo, hi) = cfl_factor_range(d);
            let f = default_cfl_factor(d);
            assert!(f >= lo && f <= hi, "dimension {d}: {f} not in [{lo}, {hi}]");
        }
    }

    #[test]
    fn test_dissipation_monotone() {
        assert!(dissipation_factor(2) <= dissipation_factor(3));
        assert!(dissipation_factor(3) <= dissipation_factor(4));
        assert_eq!(dissipation_factor(1), 1.0);
    }

    #[test]
    fn test_adaptive_dt_unclamped() {
        let dt = adaptive_dt(1, Some(0.5), 0.01, 1.0, 1e-6, 1.0).unwrap();
        assert!((dt - 0.005).abs() < 1e-15);
    }

    #[test]
    fn test_adaptive_dt_clamped() {
        let dt = adaptive_dt(3, None, 0.01, 1.0, 1e-6, 0.001).unwrap();
        assert_eq!(dt, 0.001);
        let dt = adaptive_dt(4, None, 0.01, 1.0, 0.1, 1.0).unwrap();
        assert_eq!(dt, 0.1);
    }

    #[test]
    fn test_adaptive_dt_factor_out_of_range() {
        let err = adaptive_dt(4, Some(0.5), 0.01, 1.0, 1e-6, 1.0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_adaptive_dt_respects_cfl() {
        for d in 1..=5 {
            let dt = adaptive_dt(d, None, 0.02, 2.0, 1e-9, 1.0).unwrap();
            assert!(cfl_number(2.0, dt, 0.02) <= CFL_LIMIT);
        }
    }
}
