// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all PoF kernel failures.
///
/// Numerical overflow during a run is not an error: it is absorbed by the
/// field clamp and the salience fallback. Only configuration problems and
/// caller-supplied shape mismatches surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PofError {
    /// Invalid configuration (including a violated CFL condition).
    /// Fatal for the run; a sweep driver skips the configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A caller-supplied array does not match the grid shape.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Non-finite caller input (e.g. a NaN run horizon).
    #[error("numerical error: {0}")]
    Numerical(String),
}

impl PofError {
    /// True for errors that mean "skip this configuration".
    pub fn is_configuration(&self) -> bool {
        matches!(self, PofError::Configuration(_))
    }
}

pub type PofResult<T> = Result<T, PofError>;
