// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Damped Wave Field
// ─────────────────────────────────────────────────────────────────────
//! Leapfrog integrator for the damped scalar wave equation on a periodic
//! N-dimensional grid:
//!
//!   A_next = (2 - g)·A - (1 - g)·A_prev + c²dt²·ΔA + dt²·J
//!
//! with `g = γ·dt` (simple) or `g = γ·dt·κ_D` and the whole right-hand side
//! divided by `(1 + 2g)` (stabilized), `κ_D` being the dimension-dependent
//! dissipation factor. Every step ends with an element-wise clamp to
//! `[-field_max, field_max]`.
//!
//! State is two flat row-major snapshots plus pre-allocated scratch for
//! the next snapshot and the source grid, so a step does not allocate.

use ndarray::ArrayD;
use rayon::prelude::*;

use pof_types::record::{clamp_field_value, finite_or_zero};
use pof_types::{Backend, DampingScheme, FieldConfig, PofError, PofResult, SalienceMode};

use crate::geometry::GridGeometry;
use crate::params::{cfl_number, dissipation_factor, CFL_LIMIT};
use crate::sources::Emission;

/// Per-step constants of the leapfrog update.
#[derive(Debug, Clone, Copy)]
struct Stencil {
    g: f64,
    c2dt2: f64,
    dt2: f64,
    /// `1 + 2g` for the stabilized scheme.
    divisor: Option<f64>,
    field_max: f64,
}

impl Stencil {
    #[inline]
    fn update(&self, curr: f64, prev: f64, lap: f64, source: f64) -> f64 {
        let mut next =
            (2.0 - self.g) * curr - (1.0 - self.g) * prev + self.c2dt2 * lap + self.dt2 * source;
        if let Some(d) = self.divisor {
            next /= d;
        }
        clamp_field_value(next, self.field_max)
    }
}

/// Periodic Laplacian at one cell.
#[inline]
fn cell_laplacian(data: &[f64], geometry: &GridGeometry, dx2: &[f64], i: usize) -> f64 {
    let mut lap = 0.0;
    for (axis, &h2) in dx2.iter().enumerate() {
        let (plus, minus) = geometry.neighbours(i, axis);
        lap += (data[plus] - 2.0 * data[i] + data[minus]) / h2;
    }
    lap
}

/// N-dimensional damped wave field.
#[derive(Debug, Clone)]
pub struct WaveField {
    geometry: GridGeometry,
    dx2: Vec<f64>,
    wave_speed: f64,
    gamma: f64,
    dt: f64,
    damping: DampingScheme,
    backend: Backend,
    energy_clamp: f64,
    stencil: Stencil,
    current: Vec<f64>,
    previous: Vec<f64>,
    // Scratch
    next: Vec<f64>,
    sources: Vec<f64>,
    t: f64,
    step_count: u64,
}

impl WaveField {
    /// Build a field, failing with a configuration error when
    /// `c·dt/min(dx) > 1`.
    pub fn new(config: &FieldConfig, dt: f64) -> PofResult<Self> {
        let geometry = GridGeometry::from_config(config)?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PofError::Configuration(format!(
                "dt must be finite and > 0, got {dt}"
            )));
        }

        let cfl = cfl_number(config.wave_speed, dt, geometry.min_dx());
        if cfl > CFL_LIMIT {
            return Err(PofError::Configuration(format!(
                "CFL number {cfl:.6} exceeds {CFL_LIMIT} (c={}, dt={dt}, min dx={})",
                config.wave_speed,
                geometry.min_dx()
            )));
        }

        let backend = match config.backend {
            Backend::Gpu => {
                log::warn!("GPU backend not available in this build, falling back to CPU");
                Backend::Cpu
            }
            other => other,
        };

        let dimension = geometry.dimension();
        let (g, divisor) = match config.damping {
            DampingScheme::Simple => (config.gamma * dt, None),
            DampingScheme::Stabilized => {
                let g = config.gamma * dt * dissipation_factor(dimension);
                (g, Some(1.0 + 2.0 * g))
            }
        };
        let stencil = Stencil {
            g,
            c2dt2: config.wave_speed * config.wave_speed * dt * dt,
            dt2: dt * dt,
            divisor,
            field_max: config.field_max,
        };

        let n = geometry.num_cells();
        let dx2 = geometry.dx().iter().map(|&h| h * h).collect();
        log::debug!(
            "wave field: shape={:?} cfl={cfl:.4} damping={:?} backend={backend:?}",
            geometry.shape(),
            config.damping
        );

        Ok(Self {
            geometry,
            dx2,
            wave_speed: config.wave_speed,
            gamma: config.gamma,
            dt,
            damping: config.damping,
            backend,
            energy_clamp: config.energy_clamp,
            stencil,
            current: vec![0.0; n],
            previous: vec![0.0; n],
            next: vec![0.0; n],
            sources: vec![0.0; n],
            t: 0.0,
            step_count: 0,
        })
    }

    /// Positional constructor on a grid of `grid_shape` over `[0, length]`
    /// with the remaining parameters at their defaults.
    pub fn construct(
        dimension: usize,
        grid_shape: &[usize],
        length: f64,
        wave_speed: f64,
        dt: f64,
        gamma: f64,
    ) -> PofResult<Self> {
        let config = FieldConfig {
            dimension,
            grid_shape: grid_shape.to_vec(),
            domain_length: length,
            wave_speed,
            gamma,
            ..FieldConfig::default()
        };
        Self::new(&config, dt)
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    /// Periodic Laplacian `Σ_a (A[+1] - 2A + A[-1]) / dx_a²` of an array
    /// shaped like this grid.
    pub fn laplacian(&self, field: &ArrayD<f64>) -> PofResult<ArrayD<f64>> {
        self.geometry.check_shape(field.shape())?;
        let data: Vec<f64> = field.iter().copied().collect();
        let out = (0..data.len())
            .map(|i| cell_laplacian(&data, &self.geometry, &self.dx2, i))
            .collect();
        self.geometry.to_array(out)
    }

    /// Advance one time step with this tick's emissions (possibly none).
    ///
    /// Emissions landing on the same cell add up. A cell index past the
    /// end of the grid is clamped to the last cell.
    pub fn step(&mut self, emissions: &[Emission]) {
        self.sources.iter_mut().for_each(|s| *s = 0.0);
        if let Some(last) = self.sources.len().checked_sub(1) {
            for e in emissions {
                self.sources[e.cell.min(last)] += e.amplitude;
            }
        }

        let stencil = self.stencil;
        let geometry = &self.geometry;
        let dx2 = &self.dx2;
        let current = &self.current;
        let previous = &self.previous;
        let sources = &self.sources;
        let cell = |i: usize| {
            let lap = cell_laplacian(current, geometry, dx2, i);
            stencil.update(current[i], previous[i], lap, sources[i])
        };

        match self.backend {
            Backend::CpuParallel => self
                .next
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, out)| *out = cell(i)),
            Backend::Cpu | Backend::Gpu => self
                .next
                .iter_mut()
                .enumerate()
                .for_each(|(i, out)| *out = cell(i)),
        }

        // previous ← current, current ← next
        std::mem::swap(&mut self.previous, &mut self.current);
        std::mem::swap(&mut self.current, &mut self.next);

        self.t += self.dt;
        self.step_count += 1;
    }

    /// Field energy used as the Agent's salience sample.
    ///
    /// Values are clamped to `±field_max` and again to `±energy_clamp`
    /// before squaring. A non-finite result is reported as 0.
    ///
    /// A windowed `center` must have one coordinate per grid axis.
    pub fn compute_salience(&self, mode: &SalienceMode) -> f64 {
        let field_max = self.stencil.field_max;
        let energy_clamp = self.energy_clamp;
        let clamped =
            |v: f64| clamp_field_value(clamp_field_value(v, field_max), energy_clamp);

        // Serial sum keeps the result independent of the backend.
        let sum = match mode {
            SalienceMode::Global => self
                .current
                .iter()
                .map(|&v| {
                    let w = clamped(v);
                    w * w
                })
                .fold(0.0, |acc, x| acc + x),
            SalienceMode::Windowed { center, fwhm } => {
                debug_assert_eq!(
                    center.len(),
                    self.geometry.dimension(),
                    "window centre dimension"
                );
                let sigma = fwhm / (2.0 * (2.0 * std::f64::consts::LN_2).sqrt());
                let two_sigma2 = 2.0 * sigma * sigma;
                self.current
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let r2: f64 = self
                            .geometry
                            .coordinates(i)
                            .iter()
                            .zip(center)
                            .map(|(x, c)| (x - c) * (x - c))
                            .sum();
                        let w = clamped(v);
                        (-r2 / two_sigma2).exp() * w * w
                    })
                    .fold(0.0, |acc, x| acc + x)
            }
        };
        finite_or_zero(sum * self.geometry.cell_volume(), "compute_salience")
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Current snapshot, flat row-major.
    pub fn values(&self) -> &[f64] {
        &self.current
    }

    /// Previous snapshot, flat row-major.
    pub fn previous_values(&self) -> &[f64] {
        &self.previous
    }

    /// Current snapshot as an N-dimensional array.
    pub fn snapshot(&self) -> PofResult<ArrayD<f64>> {
        self.geometry.to_array(self.current.clone())
    }

    pub fn max_abs(&self) -> f64 {
        self.current.iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Damping coefficient actually applied per step.
    pub fn gamma_eff(&self) -> f64 {
        self.stencil.g
    }

    pub fn damping(&self) -> DampingScheme {
        self.damping
    }

    /// Backend after resolution (`Gpu` resolves to `Cpu`).
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn field_max(&self) -> f64 {
        self.stencil.field_max
    }

    pub fn cfl_number(&self) -> f64 {
        cfl_number(self.wave_speed, self.dt, self.geometry.min_dx())
    }
}
