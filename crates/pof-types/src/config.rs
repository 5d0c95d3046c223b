// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Engine Configuration
// ─────────────────────────────────────────────────────────────────────
//! One immutable configuration object threaded through every constructor.
//!
//! Defaults reproduce the reference configuration: a 201-cell 1-D field on
//! `[0, 1]` with `c = 1`, `gamma = 0.001`, `dt = 0.005`, one centred source
//! and a clock driven by a relaxing single-mode substrate.

use serde::{Deserialize, Serialize};

use crate::error::{PofError, PofResult};

/// Hard element-wise clamp applied to the field after every step.
pub const DEFAULT_FIELD_MAX: f64 = 1000.0;

/// Intermediate clamp applied to field values inside the salience sum.
pub const DEFAULT_ENERGY_CLAMP: f64 = 100.0;

/// Damping formula used by the leapfrog update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DampingScheme {
    /// `A_next = (2 - g)·A - (1 - g)·A_prev + c²dt²·Δ + dt²·J`
    Simple,
    /// Simple update divided by `(1 + 2g)`, with `g` scaled by the
    /// dimension-dependent dissipation factor.
    Stabilized,
}

/// Compute backend chosen explicitly at field construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    /// Serial per-cell update.
    Cpu,
    /// Per-cell update split across the rayon pool. Bit-identical to `Cpu`.
    CpuParallel,
    /// Not available in this build; resolved to `Cpu` with a warning.
    Gpu,
}

/// How the Agent turns the field into a salience sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SalienceMode {
    /// Σ A² over the whole grid times the cell volume.
    Global,
    /// Same sum weighted by a Gaussian centred at `center` (physical
    /// coordinates) with full width at half maximum `fwhm`.
    Windowed { center: Vec<f64>, fwhm: f64 },
}

/// Per-source phase gate applied by the source schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseGate {
    /// `tick % 1 == phase % 1`: always true, every source fires on every
    /// emission tick regardless of its phase tag.
    Literal,
    /// `tick % p == phase % p`: a source fires only on ticks matching its
    /// phase tag modulo `p`.
    Period(u64),
}

/// A point emitter in continuous domain coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Coordinates in `[0, L]` per axis; out-of-range values are clamped
    /// onto the grid.
    pub position: Vec<f64>,
    /// Amplitude carried by the schedule's emissions. The tick loop
    /// replaces it with the clock amplitude `alpha_0 + alpha_1·‖x‖`.
    pub amplitude: f64,
    /// Integer phase tag consulted by the phase gate.
    pub phase: u64,
}

/// Source layout used to build the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    /// Spread along axis 0, centred on every other axis.
    Symmetric,
    /// Along the main diagonal, between 0.25·L and 0.75·L.
    Clustered,
    /// Caller-supplied sources.
    Explicit(Vec<Source>),
}

/// Source of `F_val` fed to the phase clock each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClockDrive {
    /// Fixed drive value.
    Constant(f64),
    /// `‖x‖` of the root substrate after its Euler step.
    SubstrateNorm,
}

/// Time-step policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimeStep {
    /// Use `dt` as given; still subject to the CFL gate.
    Fixed(f64),
    /// `dt = clamp(cfl_factor * min(dx) / c, dt_min, dt_max)`.
    /// `cfl_factor = None` selects the midpoint of the dimension's range.
    Adaptive {
        cfl_factor: Option<f64>,
        dt_min: f64,
        dt_max: f64,
    },
}

/// Whether a run keeps the per-sample history or only summary counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordMode {
    Full,
    Summary,
}

/// Grid geometry and wave parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Number of spatial axes.
    pub dimension: usize,
    /// Cells per axis (`len == dimension`, each ≥ 2).
    pub grid_shape: Vec<usize>,
    /// Domain size `L` on every axis.
    pub domain_length: f64,
    /// Wave speed `c`.
    pub wave_speed: f64,
    /// Damping `gamma` (per unit time).
    pub gamma: f64,
    pub damping: DampingScheme,
    pub backend: Backend,
    /// Element-wise clamp after each step.
    /// Default: 1000 (contract value).
    pub field_max: f64,
    /// Clamp on field values inside the salience sum.
    /// Default: 100 (contract value).
    pub energy_clamp: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            dimension: 1,
            grid_shape: vec![201],
            domain_length: 1.0,
            wave_speed: 1.0,
            gamma: 0.001,
            damping: DampingScheme::Simple,
            backend: Backend::Cpu,
            field_max: DEFAULT_FIELD_MAX,
            energy_clamp: DEFAULT_ENERGY_CLAMP,
        }
    }
}

impl FieldConfig {
    /// Hypercubic grid with `n` cells on each of `dimension` axes.
    pub fn cubic(dimension: usize, n: usize) -> Self {
        Self {
            dimension,
            grid_shape: vec![n; dimension],
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PofResult<()> {
        if self.dimension == 0 {
            return Err(PofError::Configuration(
                "dimension must be >= 1".to_string(),
            ));
        }
        if self.grid_shape.len() != self.dimension {
            return Err(PofError::Configuration(format!(
                "grid_shape has {} axes, dimension is {}",
                self.grid_shape.len(),
                self.dimension
            )));
        }
        if let Some(n) = self.grid_shape.iter().find(|&&n| n < 2) {
            return Err(PofError::Configuration(format!(
                "every axis needs >= 2 cells, got {n}"
            )));
        }
        require_positive("domain_length", self.domain_length)?;
        require_positive("wave_speed", self.wave_speed)?;
        if !self.gamma.is_finite() || self.gamma < 0.0 {
            return Err(PofError::Configuration(format!(
                "gamma must be finite and >= 0, got {}",
                self.gamma
            )));
        }
        require_positive("field_max", self.field_max)?;
        require_positive("energy_clamp", self.energy_clamp)?;
        Ok(())
    }
}

/// Source layout and gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub placement: Placement,
    /// Number of sources for the factory placements (ignored by `Explicit`).
    pub num_sources: usize,
    pub phase_gate: PhaseGate,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            placement: Placement::Symmetric,
            num_sources: 1,
            phase_gate: PhaseGate::Literal,
        }
    }
}

/// Phase clock parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Phase velocity `omega_P`.
    pub omega_p: f64,
    /// Rung margin: successive rungs are `1 + delta` apart.
    pub delta: f64,
    pub drive: ClockDrive,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            omega_p: 20.0,
            delta: 0.0,
            drive: ClockDrive::SubstrateNorm,
        }
    }
}

/// Linear system `dx/dt = A·x + b` of the root substrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstrateConfig {
    /// `A`, n×n row-major.
    pub a: Vec<f64>,
    pub b: Vec<f64>,
    /// Initial state (length n).
    pub x0: Vec<f64>,
}

impl Default for SubstrateConfig {
    /// Single mode relaxing at rate 0.1 from `x = 1`.
    fn default() -> Self {
        Self {
            a: vec![-0.1],
            b: vec![0.0],
            x0: vec![1.0],
        }
    }
}

impl SubstrateConfig {
    pub fn order(&self) -> usize {
        self.x0.len()
    }
}

/// PoF emission amplitude `alpha_0 + alpha_1·‖x‖`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionConfig {
    pub alpha_0: f64,
    pub alpha_1: f64,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            alpha_0: 2.0,
            alpha_1: 0.0,
        }
    }
}

/// Salience accumulator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Overshoot tolerance; the commit threshold is `1 + epsilon`.
    pub epsilon: f64,
    /// Sampling stride `M`: only every M-th PoF tick is sampled.
    pub stride: u64,
    pub mode: SalienceMode,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.25,
            stride: 1,
            mode: SalienceMode::Global,
        }
    }
}

impl AgentConfig {
    pub fn threshold(&self) -> f64 {
        1.0 + self.epsilon
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub field: FieldConfig,
    pub time_step: TimeStep,
    pub sources: SourceConfig,
    pub clock: ClockConfig,
    pub substrate: SubstrateConfig,
    pub emission: EmissionConfig,
    pub agent: AgentConfig,
    pub record_mode: RecordMode,
    /// Optional tick budget; a run stopped by it returns a partial report.
    pub max_ticks: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            time_step: TimeStep::Fixed(0.005),
            sources: SourceConfig::default(),
            clock: ClockConfig::default(),
            substrate: SubstrateConfig::default(),
            emission: EmissionConfig::default(),
            agent: AgentConfig::default(),
            record_mode: RecordMode::Full,
            max_ticks: None,
        }
    }
}

impl EngineConfig {
    /// Validate every parameter that can be checked without grid geometry.
    /// The CFL gate itself runs at field construction.
    pub fn validate(&self) -> PofResult<()> {
        self.field.validate()?;

        match self.time_step {
            TimeStep::Fixed(dt) => require_positive("dt", dt)?,
            TimeStep::Adaptive {
                cfl_factor,
                dt_min,
                dt_max,
            } => {
                require_positive("dt_min", dt_min)?;
                require_positive("dt_max", dt_max)?;
                if dt_min > dt_max {
                    return Err(PofError::Configuration(format!(
                        "dt_min ({dt_min}) must not exceed dt_max ({dt_max})"
                    )));
                }
                if let Some(f) = cfl_factor {
                    require_positive("cfl_factor", f)?;
                }
            }
        }

        let dim = self.field.dimension;
        match &self.sources.placement {
            Placement::Explicit(sources) => {
                for (i, s) in sources.iter().enumerate() {
                    if s.position.len() != dim {
                        return Err(PofError::Configuration(format!(
                            "source {i} has {} coordinates, dimension is {dim}",
                            s.position.len()
                        )));
                    }
                    if !s.amplitude.is_finite() {
                        return Err(PofError::Configuration(format!(
                            "source {i} amplitude must be finite"
                        )));
                    }
                }
            }
            Placement::Symmetric | Placement::Clustered => {}
        }
        if self.sources.phase_gate == PhaseGate::Period(0) {
            return Err(PofError::Configuration(
                "phase gate period must be >= 1".to_string(),
            ));
        }

        require_finite("omega_p", self.clock.omega_p)?;
        if !self.clock.delta.is_finite() || self.clock.delta <= -1.0 {
            return Err(PofError::Configuration(format!(
                "delta must be finite and > -1, got {}",
                self.clock.delta
            )));
        }
        if let ClockDrive::Constant(f) = self.clock.drive {
            require_finite("clock drive", f)?;
        }

        let n = self.substrate.order();
        if n == 0 {
            return Err(PofError::Configuration(
                "substrate needs at least one state variable".to_string(),
            ));
        }
        if self.substrate.a.len() != n * n || self.substrate.b.len() != n {
            return Err(PofError::Configuration(format!(
                "substrate of order {n} needs A with {} entries and b with {n}, got {} and {}",
                n * n,
                self.substrate.a.len(),
                self.substrate.b.len()
            )));
        }
        let all_finite = self
            .substrate
            .a
            .iter()
            .chain(&self.substrate.b)
            .chain(&self.substrate.x0)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(PofError::Configuration(
                "substrate entries must be finite".to_string(),
            ));
        }

        require_finite("alpha_0", self.emission.alpha_0)?;
        require_finite("alpha_1", self.emission.alpha_1)?;

        if self.agent.stride == 0 {
            return Err(PofError::Configuration(
                "agent stride must be >= 1".to_string(),
            ));
        }
        if !self.agent.epsilon.is_finite() || self.agent.epsilon <= -1.0 {
            return Err(PofError::Configuration(format!(
                "epsilon must be finite and > -1, got {}",
                self.agent.epsilon
            )));
        }
        if let SalienceMode::Windowed { center, fwhm } = &self.agent.mode {
            if center.len() != dim {
                return Err(PofError::Configuration(format!(
                    "salience window centre has {} coordinates, dimension is {dim}",
                    center.len()
                )));
            }
            require_positive("fwhm", *fwhm)?;
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> PofResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PofError::Configuration(format!("JSON parse error: {e}")))
    }
}

fn require_finite(name: &str, value: f64) -> PofResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PofError::Configuration(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

fn require_positive(name: &str, value: f64) -> PofResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PofError::Configuration(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}
