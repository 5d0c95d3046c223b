// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Grid Geometry
// ─────────────────────────────────────────────────────────────────────
//! Row-major N-dimensional grid on `[0, L]^N` with `n_a` nodes per axis
//! and spacing `dx_a = L / (n_a - 1)`.

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use pof_types::{FieldConfig, PofError, PofResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    shape: Vec<usize>,
    strides: Vec<usize>,
    dx: Vec<f64>,
    length: f64,
    num_cells: usize,
}

impl GridGeometry {
    pub fn new(shape: &[usize], length: f64) -> PofResult<Self> {
        if shape.is_empty() {
            return Err(PofError::Configuration(
                "grid needs at least one axis".to_string(),
            ));
        }
        if let Some(n) = shape.iter().find(|&&n| n < 2) {
            return Err(PofError::Configuration(format!(
                "every axis needs >= 2 cells, got {n}"
            )));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(PofError::Configuration(format!(
                "domain length must be finite and > 0, got {length}"
            )));
        }

        let mut strides = vec![1usize; shape.len()];
        for a in (0..shape.len().saturating_sub(1)).rev() {
            strides[a] = strides[a + 1] * shape[a + 1];
        }
        let dx = shape.iter().map(|&n| length / (n - 1) as f64).collect();

        Ok(Self {
            shape: shape.to_vec(),
            strides,
            dx,
            length,
            num_cells: shape.iter().product(),
        })
    }

    pub fn from_config(config: &FieldConfig) -> PofResult<Self> {
        config.validate()?;
        Self::new(&config.grid_shape, config.domain_length)
    }

    pub fn dimension(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn dx(&self) -> &[f64] {
        &self.dx
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    pub fn min_dx(&self) -> f64 {
        self.dx.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Product of all spacings.
    pub fn cell_volume(&self) -> f64 {
        self.dx.iter().product()
    }

    /// Map a continuous position to a grid index: `round(p/L·(n-1))`,
    /// clamped into `[0, n-1]`. Missing trailing coordinates map to 0;
    /// NaN maps to 0.
    pub fn cell_index(&self, position: &[f64]) -> Vec<usize> {
        self.shape
            .iter()
            .enumerate()
            .map(|(a, &n)| {
                let p = position.get(a).copied().unwrap_or(0.0);
                let top = (n - 1) as f64;
                let raw = (p / self.length * top).round();
                if raw.is_nan() {
                    0
                } else {
                    raw.clamp(0.0, top) as usize
                }
            })
            .collect()
    }

    /// Flat row-major offset of a multi-index. Out-of-range components are
    /// clamped to the last node.
    pub fn flat_index(&self, index: &[usize]) -> usize {
        self.shape
            .iter()
            .zip(&self.strides)
            .enumerate()
            .map(|(a, (&n, &s))| index.get(a).copied().unwrap_or(0).min(n - 1) * s)
            .sum()
    }

    pub fn unravel(&self, flat: usize) -> Vec<usize> {
        self.shape
            .iter()
            .zip(&self.strides)
            .map(|(&n, &s)| (flat / s) % n)
            .collect()
    }

    /// Physical coordinates `i_a · dx_a` of a cell.
    pub fn coordinates(&self, flat: usize) -> Vec<f64> {
        self.unravel(flat)
            .iter()
            .zip(&self.dx)
            .map(|(&i, &dx)| i as f64 * dx)
            .collect()
    }

    /// Periodic `(+1, -1)` neighbours of a cell along `axis`.
    #[inline]
    pub fn neighbours(&self, flat: usize, axis: usize) -> (usize, usize) {
        let n = self.shape[axis];
        let s = self.strides[axis];
        let i = (flat / s) % n;
        let plus = if i + 1 == n { flat - (n - 1) * s } else { flat + s };
        let minus = if i == 0 { flat + (n - 1) * s } else { flat - s };
        (plus, minus)
    }

    /// Reject an array whose shape differs from the grid.
    pub fn check_shape(&self, actual: &[usize]) -> PofResult<()> {
        if actual == self.shape.as_slice() {
            Ok(())
        } else {
            Err(PofError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: actual.to_vec(),
            })
        }
    }

    /// Wrap flat row-major data as an N-dimensional array.
    pub fn to_array(&self, data: Vec<f64>) -> PofResult<ArrayD<f64>> {
        let len = data.len();
        ArrayD::from_shape_vec(IxDyn(&self.shape), data).map_err(|_| PofError::ShapeMismatch {
            expected: self.shape.clone(),
            actual: vec![len],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_and_volume() {
        let g = GridGeometry::new(&[201], 1.0).unwrap();
        assert_eq!(g.dx()[0], 0.005);
        assert_eq!(g.cell_volume(), 0.005);
        let g = GridGeometry::new(&[11, 21], 2.0).unwrap();
        assert!((g.cell_volume() - 0.2 * 0.1).abs() < 1e-15);
        assert!((g.min_dx() - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_strides_row_major() {
        let g = GridGeometry::new(&[3, 4, 5], 1.0).unwrap();
        assert_eq!(g.strides(), &[20, 5, 1]);
        assert_eq!(g.num_cells(), 60);
        assert_eq!(g.flat_index(&[1, 2, 3]), 20 + 10 + 3);
        assert_eq!(g.unravel(33), vec![1, 2, 3]);
    }

    #[test]
    fn test_cell_index_centre() {
        let g = GridGeometry::new(&[201], 1.0).unwrap();
        assert_eq!(g.cell_index(&[0.5]), vec![100]);
    }

    #[test]
    fn test_cell_index_clamped() {
        let g = GridGeometry::new(&[11, 11], 1.0).unwrap();
        assert_eq!(g.cell_index(&[-3.0, 7.5]), vec![0, 10]);
        assert_eq!(g.cell_index(&[f64::NAN, 0.5]), vec![0, 5]);
    }

    #[test]
    fn test_neighbours_wrap() {
        let g = GridGeometry::new(&[4, 5], 1.0).unwrap();
        // Row 0, column 0: left neighbour wraps to column 4.
        assert_eq!(g.neighbours(0, 1), (1, 4));
        // Row 0: upward neighbour wraps to row 3.
        assert_eq!(g.neighbours(0, 0), (5, 15));
        // Row 3, column 4: both wrap forward.
        let last = g.flat_index(&[3, 4]);
        assert_eq!(g.neighbours(last, 0), (4, 14));
        assert_eq!(g.neighbours(last, 1), (15, 18));
    }

    #[test]
    fn test_degenerate_axis_rejected() {
        assert!(GridGeometry::new(&[1], 1.0).is_err());
        assert!(GridGeometry::new(&[], 1.0).is_err());
        assert!(GridGeometry::new(&[4], 0.0).is_err());
    }

    #[test]
    fn test_check_shape() {
        let g = GridGeometry::new(&[4, 4], 1.0).unwrap();
        assert!(g.check_shape(&[4, 4]).is_ok());
        assert!(matches!(
            g.check_shape(&[16]),
            Err(PofError::ShapeMismatch { .. })
        ));
    }
}
