// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Root Substrate
// ─────────────────────────────────────────────────────────────────────
//! Forward-Euler integrator for the linear substrate
//!
//!   dx/dt = A·x + b
//!
//! whose norm drives the phase clock and biases the emission amplitude.

use serde::{Deserialize, Serialize};

use pof_types::{PofError, PofResult, SubstrateConfig};

/// Linear substrate state with pre-allocated derivative scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootSubstrate {
    n: usize,
    /// `A`, n×n row-major.
    a: Vec<f64>,
    b: Vec<f64>,
    x: Vec<f64>,
    #[serde(skip)]
    dx: Vec<f64>,
    step_count: u64,
}

impl RootSubstrate {
    pub fn new(a: Vec<f64>, b: Vec<f64>, x0: Vec<f64>) -> PofResult<Self> {
        let n = x0.len();
        if n == 0 || a.len() != n * n || b.len() != n {
            return Err(PofError::ShapeMismatch {
                expected: vec![n, n],
                actual: vec![a.len(), b.len()],
            });
        }
        Ok(Self {
            n,
            a,
            b,
            x: x0,
            dx: vec![0.0; n],
            step_count: 0,
        })
    }

    pub fn from_config(config: &SubstrateConfig) -> PofResult<Self> {
        Self::new(config.a.clone(), config.b.clone(), config.x0.clone())
    }

    /// One Euler step: `x ← x + dt·(A·x + b)`.
    pub fn step(&mut self, dt: f64) {
        if self.dx.len() != self.n {
            self.dx = vec![0.0; self.n];
        }
        for i in 0..self.n {
            let row = &self.a[i * self.n..(i + 1) * self.n];
            let s = row
                .iter()
                .zip(&self.x)
                .fold(0.0, |acc, (a_ij, x_j)| acc + a_ij * x_j);
            self.dx[i] = s + self.b[i];
        }
        for (x, d) in self.x.iter_mut().zip(&self.dx) {
            *x += dt * d;
        }
        self.step_count += 1;
    }

    /// Euclidean norm `‖x‖`.
    pub fn norm(&self) -> f64 {
        self.x.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// PoF emission amplitude `alpha_0 + alpha_1·‖x‖`.
    pub fn emission_amplitude(&self, alpha_0: f64, alpha_1: f64) -> f64 {
        alpha_0 + alpha_1 * self.norm()
    }

    pub fn state(&self) -> &[f64] {
        &self.x
    }

    pub fn order(&self) -> usize {
        self.n
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_relaxes() {
        let mut s = RootSubstrate::from_config(&SubstrateConfig::default()).unwrap();
        assert_eq!(s.norm(), 1.0);
        s.step(0.005);
        assert!((s.state()[0] - (1.0 - 0.0005)).abs() < 1e-15);
        for _ in 0..100_000 {
            s.step(0.005);
        }
        assert!(s.norm() < 1e-10);
        assert_eq!(s.step_count(), 100_001);
    }

    #[test]
    fn test_constant_forcing() {
        // A = 0, b = 2: x grows linearly.
        let mut s = RootSubstrate::new(vec![0.0], vec![2.0], vec![0.0]).unwrap();
        for _ in 0..10 {
            s.step(0.1);
        }
        assert!((s.state()[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_mode_rotation_row_major() {
        // A = [[0, 1], [-1, 0]] rotates; Euler grows the norm slightly.
        let mut s = RootSubstrate::new(vec![0.0, 1.0, -1.0, 0.0], vec![0.0, 0.0], vec![1.0, 0.0])
            .unwrap();
        s.step(0.1);
        assert_eq!(s.state(), &[1.0, -0.1]);
        assert!(s.norm() > 1.0);
    }

    #[test]
    fn test_emission_amplitude() {
        let s = RootSubstrate::new(vec![0.0; 4], vec![0.0; 2], vec![3.0, 4.0]).unwrap();
        assert_eq!(s.norm(), 5.0);
        assert_eq!(s.emission_amplitude(1.0, 0.5), 3.5);
        assert_eq!(s.emission_amplitude(2.0, 0.0), 2.0);
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(RootSubstrate::new(vec![1.0, 2.0], vec![0.0], vec![1.0]).is_err());
        assert!(RootSubstrate::new(vec![], vec![], vec![]).is_err());
        assert!(RootSubstrate::new(vec![0.0; 4], vec![0.0], vec![1.0, 1.0]).is_err());
    }
}
