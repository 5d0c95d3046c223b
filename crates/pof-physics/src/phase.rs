// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Tick Phase Generator
// ─────────────────────────────────────────────────────────────────────
//! Monotone phase accumulator that fires a PoF tick whenever the phase
//! climbs past the next rung `(n + 1)·(1 + delta)`.

use serde::{Deserialize, Serialize};

/// A detected rung crossing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseCrossing {
    /// Crossings so far, including this one.
    pub index: u64,
    pub theta: f64,
    /// The rung that was crossed.
    pub rung: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickPhaseGenerator {
    theta: f64,
    n_threshold: u64,
    delta: f64,
}

impl TickPhaseGenerator {
    pub fn new(delta: f64) -> Self {
        Self {
            theta: 0.0,
            n_threshold: 0,
            delta,
        }
    }

    /// Next rung boundary `(n_threshold + 1)·(1 + delta)`.
    pub fn next_rung(&self) -> f64 {
        (self.n_threshold + 1) as f64 * (1.0 + self.delta)
    }

    /// Advance the phase by `dt·omega_p·f_val` and report a crossing.
    ///
    /// At most one crossing is reported per call: when a large increment
    /// spans several rungs, the backlog drains one rung per call.
    pub fn update(&mut self, omega_p: f64, f_val: f64, dt: f64) -> Option<PhaseCrossing> {
        self.theta += dt * omega_p * f_val;
        let rung = self.next_rung();
        if self.theta >= rung {
            self.n_threshold += 1;
            Some(PhaseCrossing {
                index: self.n_threshold,
                theta: self.theta,
                rung,
            })
        } else {
            None
        }
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn n_threshold(&self) -> u64 {
        self.n_threshold
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_crossings(dt: f64, omega_p: f64, horizon: f64) -> u64 {
        let mut clock = TickPhaseGenerator::new(0.0);
        let steps = (horizon / dt).round() as u64;
        (0..steps)
            .filter(|_| clock.update(omega_p, 1.0, dt).is_some())
            .count() as u64
    }

    #[test]
    fn test_first_rung_is_one_plus_delta() {
        assert_eq!(TickPhaseGenerator::new(0.0).next_rung(), 1.0);
        assert_eq!(TickPhaseGenerator::new(0.5).next_rung(), 1.5);
    }

    #[test]
    fn test_staircase_indices() {
        let mut clock = TickPhaseGenerator::new(0.0);
        let mut seen = Vec::new();
        for _ in 0..35 {
            if let Some(c) = clock.update(1.0, 1.0, 0.1) {
                seen.push((c.index, c.rung));
            }
        }
        let indices: Vec<u64> = seen.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(seen.iter().all(|(i, r)| *r == *i as f64));
        assert_eq!(clock.n_threshold(), 3);
    }

    #[test]
    fn test_tick_count_independent_of_dt() {
        // Phase reaches 10.5 by t = 1.05 for any step size.
        let coarse = count_crossings(0.01, 10.0, 1.05);
        let fine = count_crossings(0.001, 10.0, 1.05);
        assert_eq!(coarse, 10);
        assert_eq!(fine, 10);
    }

    #[test]
    fn test_delta_staircase_independent_of_dt() {
        // delta = 0.5: rungs every 1.5; phase reaches ~10 by t = 1.
        for dt in [0.01_f64, 0.001] {
            let mut clock = TickPhaseGenerator::new(0.5);
            let steps = (1.0 / dt).round() as u64;
            let crossings: Vec<PhaseCrossing> = (0..steps)
                .filter_map(|_| clock.update(10.0, 1.0, dt))
                .collect();
            assert_eq!(crossings.len(), 6, "dt {dt}");
            for (k, c) in crossings.iter().enumerate() {
                assert!((c.rung - 1.5 * (k + 1) as f64).abs() < 1e-12);
                // A crossing overshoots its rung by less than one increment.
                assert!(c.theta >= c.rung && c.theta - c.rung < 10.0 * dt + 1e-12);
            }
            for w in crossings.windows(2) {
                assert!((w[1].theta - w[0].theta - 1.5).abs() < 10.0 * dt + 1e-12);
            }
        }
    }

    #[test]
    fn test_at_most_one_crossing_per_update() {
        let mut clock = TickPhaseGenerator::new(0.0);
        let c = clock.update(1.0, 5.5, 1.0).unwrap();
        assert_eq!(c.index, 1);
        assert_eq!(clock.n_threshold(), 1);
        // Backlog drains one rung per call with no further phase advance.
        let drained = (0..10).filter(|_| clock.update(1.0, 0.0, 1.0).is_some()).count();
        assert_eq!(drained, 4);
        assert_eq!(clock.n_threshold(), 5);
    }

    #[test]
    fn test_delta_spaces_rungs() {
        let mut clock = TickPhaseGenerator::new(1.0);
        let crossings: Vec<f64> = (0..90)
            .filter_map(|_| clock.update(1.0, 1.0, 0.1))
            .map(|c| c.rung)
            .collect();
        assert_eq!(crossings, vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_zero_drive_never_fires() {
        let mut clock = TickPhaseGenerator::new(0.0);
        assert!((0..1000).all(|_| clock.update(20.0, 0.0, 0.005).is_none()));
        assert_eq!(clock.theta(), 0.0);
    }
}
