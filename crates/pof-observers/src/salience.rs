// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Salience Accumulator (Agent)
// ─────────────────────────────────────────────────────────────────────
//! Integrates field salience over the PoF commit stream.
//!
//! On every PoF tick the Agent bumps `tick_count`; every `M`-th tick it
//! samples `S = compute_salience(mode)` and adds it to `Psi`. Once
//! `Psi >= 1 + epsilon` it records a commit and hard-resets `Psi` to 0.
//! Whatever overshoot triggered the commit is discarded.

use serde::{Deserialize, Serialize};

use pof_physics::WaveField;
use pof_types::record::finite_or_zero;
use pof_types::{AgentCommit, AgentConfig, RecordMode, SalienceMode, SampleRecord};

/// Accumulator state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub psi: f64,
    pub threshold: f64,
    pub tick_count: u64,
    pub sample_count: u64,
    pub commit_count: u64,
    pub max_salience: f64,
    pub first_commit_time: Option<f64>,
    pub last_commit_time: Option<f64>,
}

impl AgentState {
    /// Distance still to go before the next commit, never negative.
    pub fn deficit(&self) -> f64 {
        (self.threshold - self.psi).max(0.0)
    }
}

/// Salience accumulator with hard reset on commit.
#[derive(Debug, Clone)]
pub struct SalienceAccumulator {
    psi: f64,
    epsilon: f64,
    stride: u64,
    mode: SalienceMode,
    tick_count: u64,
    sample_count: u64,
    commit_count: u64,
    max_salience: f64,
    first_commit_time: Option<f64>,
    last_commit_time: Option<f64>,
    /// Per-sample log; `None` in summary mode.
    history: Option<Vec<SampleRecord>>,
}

impl SalienceAccumulator {
    pub fn new(config: &AgentConfig, record_mode: RecordMode) -> Self {
        Self {
            psi: 0.0,
            epsilon: config.epsilon,
            stride: config.stride.max(1),
            mode: config.mode.clone(),
            tick_count: 0,
            sample_count: 0,
            commit_count: 0,
            max_salience: 0.0,
            first_commit_time: None,
            last_commit_time: None,
            history: match record_mode {
                RecordMode::Full => Some(Vec::new()),
                RecordMode::Summary => None,
            },
        }
    }

    /// Commit threshold `1 + epsilon`.
    pub fn threshold(&self) -> f64 {
        1.0 + self.epsilon
    }

    /// Feed one PoF tick. `field` must already hold the state after this
    /// tick's step; `time` is the field time after that step.
    pub fn on_pof_tick(&mut self, tick: u64, time: f64, field: &WaveField) -> Option<AgentCommit> {
        self.tick_count += 1;
        if self.tick_count % self.stride != 0 {
            return None;
        }
        let salience = field.compute_salience(&self.mode);
        self.record_sample(tick, time, salience)
    }

    /// Add one salience sample to `Psi` and fire a commit on crossing.
    pub fn record_sample(&mut self, tick: u64, time: f64, salience: f64) -> Option<AgentCommit> {
        let salience = finite_or_zero(salience, "salience sample");
        self.sample_count += 1;
        self.max_salience = self.max_salience.max(salience);
        self.psi += salience;

        let psi = self.psi;
        let committed = psi >= self.threshold();
        if let Some(history) = self.history.as_mut() {
            history.push(SampleRecord {
                tick,
                time,
                psi,
                salience,
                committed,
            });
        }
        if !committed {
            return None;
        }

        self.psi = 0.0;
        self.commit_count += 1;
        self.first_commit_time.get_or_insert(time);
        self.last_commit_time = Some(time);
        log::debug!(
            "agent commit #{} at tick {tick} (t={time:.4}, psi={psi:.6}, S={salience:.6})",
            self.commit_count
        );
        Some(AgentCommit {
            tick,
            time,
            psi,
            salience,
        })
    }

    pub fn psi(&self) -> f64 {
        self.psi
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn mode(&self) -> &SalienceMode {
        &self.mode
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn commit_count(&self) -> u64 {
        self.commit_count
    }

    pub fn max_salience(&self) -> f64 {
        self.max_salience
    }

    pub fn first_commit_time(&self) -> Option<f64> {
        self.first_commit_time
    }

    pub fn last_commit_time(&self) -> Option<f64> {
        self.last_commit_time
    }

    pub fn history(&self) -> Option<&[SampleRecord]> {
        self.history.as_deref()
    }

    /// Hand the per-sample log to the caller, leaving an empty one behind.
    pub fn take_history(&mut self) -> Option<Vec<SampleRecord>> {
        self.history.as_mut().map(std::mem::take)
    }

    pub fn state(&self) -> AgentState {
        AgentState {
            psi: self.psi,
            threshold: self.threshold(),
            tick_count: self.tick_count,
            sample_count: self.sample_count,
            commit_count: self.commit_count,
            max_salience: self.max_salience,
            first_commit_time: self.first_commit_time,
            last_commit_time: self.last_commit_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pof_physics::Emission;
    use pof_types::FieldConfig;

    /// 11-cell field whose global salience is 0.1 after one step.
    fn pulsed_field() -> WaveField {
        let cfg = FieldConfig {
            grid_shape: vec![11],
            gamma: 0.0,
            ..FieldConfig::default()
        };
        let mut f = WaveField::new(&cfg, 0.05).unwrap();
        f.step(&[Emission {
            index: vec![5],
            cell: 5,
            amplitude: 400.0,
        }]);
        f
    }

    fn agent(epsilon: f64, stride: u64, mode: RecordMode) -> SalienceAccumulator {
        let cfg = AgentConfig {
            epsilon,
            stride,
            ..AgentConfig::default()
        };
        SalienceAccumulator::new(&cfg, mode)
    }

    #[test]
    fn test_threshold() {
        assert_eq!(agent(0.25, 1, RecordMode::Full).threshold(), 1.25);
    }

    #[test]
    fn test_hard_reset_to_exact_zero() {
        let field = pulsed_field();
        let mut a = agent(0.25, 1, RecordMode::Full);
        let mut commits = Vec::new();
        for tick in 0..30 {
            if let Some(c) = a.on_pof_tick(tick, 0.05, &field) {
                assert_eq!(a.psi(), 0.0);
                commits.push(c);
            }
        }
        // 0.1 per sample: 13 samples reach 1.3 ≥ 1.25.
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].tick, 12);
        assert_eq!(commits[1].tick, 25);
        assert!(commits.iter().all(|c| c.psi >= 1.25 && c.psi < 1.35));
        assert_eq!(a.commit_count(), 2);
    }

    #[test]
    fn test_overshoot_discarded() {
        let mut a = agent(0.0, 1, RecordMode::Full);
        let c = a.record_sample(0, 1.0, 1.75).unwrap();
        assert_eq!(c.psi, 1.75);
        assert_eq!(a.psi(), 0.0);
        assert!(a.record_sample(1, 2.0, 0.5).is_none());
        assert_eq!(a.psi(), 0.5);
    }

    #[test]
    fn test_stride_samples_every_mth_tick() {
        let field = pulsed_field();
        let mut a = agent(100.0, 3, RecordMode::Full);
        for tick in 0..10 {
            a.on_pof_tick(tick, 0.0, &field);
        }
        assert_eq!(a.tick_count(), 10);
        assert_eq!(a.sample_count(), 3);
        let ticks: Vec<u64> = a.history().unwrap().iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![2, 5, 8]);
    }

    #[test]
    fn test_history_records_psi_before_reset() {
        let mut a = agent(0.0, 1, RecordMode::Full);
        a.record_sample(0, 0.5, 0.6);
        a.record_sample(1, 1.0, 0.6);
        let h = a.history().unwrap();
        assert_eq!(h.len(), 2);
        assert!(!h[0].committed);
        assert!(h[1].committed);
        assert!((h[1].psi - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_summary_mode_keeps_no_history() {
        let mut a = agent(0.0, 1, RecordMode::Summary);
        a.record_sample(0, 0.5, 2.0);
        assert!(a.history().is_none());
        assert!(a.take_history().is_none());
        assert_eq!(a.commit_count(), 1);
    }

    #[test]
    fn test_commit_times_tracked() {
        let mut a = agent(0.0, 1, RecordMode::Summary);
        assert!(a.first_commit_time().is_none());
        a.record_sample(0, 1.5, 1.0);
        a.record_sample(1, 2.5, 0.1);
        a.record_sample(2, 3.5, 1.0);
        assert_eq!(a.first_commit_time(), Some(1.5));
        assert_eq!(a.last_commit_time(), Some(3.5));
        assert_eq!(a.max_salience(), 1.0);
    }

    #[test]
    fn test_non_finite_sample_counts_as_zero() {
        let mut a = agent(0.25, 1, RecordMode::Full);
        assert!(a.record_sample(0, 0.0, f64::NAN).is_none());
        assert!(a.record_sample(1, 0.0, f64::INFINITY).is_none());
        assert_eq!(a.psi(), 0.0);
        assert_eq!(a.sample_count(), 2);
    }

    #[test]
    fn test_state_deficit() {
        let mut a = agent(0.25, 1, RecordMode::Summary);
        a.record_sample(0, 0.0, 1.0);
        let s = a.state();
        assert!((s.deficit() - 0.25).abs() < 1e-15);
        a.record_sample(1, 0.0, 0.5);
        assert_eq!(a.state().deficit(), 1.25);
    }
}
