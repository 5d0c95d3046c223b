// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Run Records
// ─────────────────────────────────────────────────────────────────────
//! In-memory records produced by a run. External collaborators serialise
//! them however they like; no format is part of the contract.

use serde::{Deserialize, Serialize};

/// Replace a non-finite value with 0.0.
///
/// Used by the salience computation: an overflowed energy sum becomes a
/// zero sample rather than poisoning `Psi`.
#[inline]
pub fn finite_or_zero(value: f64, what: &str) -> f64 {
    if value.is_finite() {
        value
    } else {
        log::warn!("{what}: non-finite value {value}, substituting 0.0");
        0.0
    }
}

/// Clamp a field value to `[-limit, limit]`, mapping NaN to 0.0.
#[inline]
pub fn clamp_field_value(value: f64, limit: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-limit, limit)
    }
}

/// A PoF commit tick emitted by the phase clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PofTick {
    /// 1-based index of this crossing.
    pub index: u64,
    /// Simulation tick on which the crossing happened.
    pub tick: u64,
    /// Accumulated phase when the crossing was detected.
    pub theta: f64,
    /// Rung boundary that was crossed.
    pub rung: f64,
    /// Emission amplitude `alpha_0 + alpha_1·‖x‖`.
    pub amplitude: f64,
}

/// A threshold crossing of the salience accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCommit {
    pub tick: u64,
    /// Field time after the step that was sampled.
    pub time: f64,
    /// `Psi` at the crossing, before the reset.
    pub psi: f64,
    /// The salience sample that triggered the crossing.
    pub salience: f64,
}

/// Either kind of commit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommitEvent {
    Pof(PofTick),
    Agent(AgentCommit),
}

/// One Agent sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub tick: u64,
    pub time: f64,
    /// `Psi` after adding the sample (before any reset).
    pub psi: f64,
    pub salience: f64,
    pub committed: bool,
}

/// Compact statistics for memory-bounded sweeps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Simulation ticks executed.
    pub sim_ticks: u64,
    /// Field time at the end of the run.
    pub final_time: f64,
    /// PoF ticks seen by the Agent.
    pub tick_count: u64,
    /// PoF ticks that were sampled (every M-th).
    pub sample_count: u64,
    /// Agent commits.
    pub commit_count: u64,
    pub first_commit_time: Option<f64>,
    pub last_commit_time: Option<f64>,
    /// Agent commits per unit simulated time.
    pub commit_rate: f64,
    pub max_salience: f64,
    pub final_psi: f64,
    /// `1 + epsilon`.
    pub psi_threshold: f64,
    /// `max(0, psi_threshold - final_psi)`.
    pub psi_deficit: f64,
    /// True when the tick budget stopped the run before `T`.
    pub truncated: bool,
}

impl RunSummary {
    pub fn has_commit(&self) -> bool {
        self.commit_count > 0
    }
}

/// Result of `Orchestrator::run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: RunSummary,
    /// Per-sample history; `None` in summary mode.
    pub history: Option<Vec<SampleRecord>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_or_zero_nan() {
        assert_eq!(finite_or_zero(f64::NAN, "test"), 0.0);
    }

    #[test]
    fn test_finite_or_zero_inf() {
        assert_eq!(finite_or_zero(f64::INFINITY, "test"), 0.0);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY, "test"), 0.0);
    }

    #[test]
    fn test_finite_or_zero_passthrough() {
        assert_eq!(finite_or_zero(0.75, "test"), 0.75);
    }

    #[test]
    fn test_clamp_field_value() {
        assert_eq!(clamp_field_value(1e9, 1000.0), 1000.0);
        assert_eq!(clamp_field_value(-1e9, 1000.0), -1000.0);
        assert_eq!(clamp_field_value(f64::INFINITY, 1000.0), 1000.0);
        assert_eq!(clamp_field_value(f64::NAN, 1000.0), 0.0);
        assert_eq!(clamp_field_value(3.5, 1000.0), 3.5);
    }

    #[test]
    fn test_summary_has_commit() {
        let s = RunSummary {
            commit_count: 2,
            ..Default::default()
        };
        assert!(s.has_commit());
        assert!(!RunSummary::default().has_commit());
    }
}
