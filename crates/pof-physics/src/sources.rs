// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Emission Sources
// ─────────────────────────────────────────────────────────────────────
//! Fixed list of point sources mapped onto the grid once, plus the two
//! deterministic placement factories.

use serde::{Deserialize, Serialize};

use pof_types::{PhaseGate, Placement, PofError, PofResult, Source, SourceConfig};

use crate::geometry::GridGeometry;

/// One source contribution for a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    /// Clamped grid index per axis.
    pub index: Vec<usize>,
    /// Flat row-major offset of `index`.
    pub cell: usize,
    pub amplitude: f64,
}

/// `k` sources spread along axis 0 at `L·(i+1)/(k+1)`, centred (`L/2`) on
/// every other axis. A single source sits at the exact centre.
pub fn symmetric_sources(
    num_sources: usize,
    dimension: usize,
    length: f64,
    alpha_0: f64,
) -> Vec<Source> {
    (0..num_sources)
        .map(|i| {
            let mut position = vec![length / 2.0; dimension];
            if let Some(first) = position.first_mut() {
                *first = length * (i + 1) as f64 / (num_sources + 1) as f64;
            }
            Source {
                position,
                amplitude: alpha_0,
                phase: i as u64,
            }
        })
        .collect()
}

/// `k` sources on the main diagonal at `t = 0.25 + 0.5·i/(k-1)`
/// (`t = 0.5` for a single source), every coordinate `L·t`.
pub fn clustered_sources(
    num_sources: usize,
    dimension: usize,
    length: f64,
    alpha_0: f64,
) -> Vec<Source> {
    (0..num_sources)
        .map(|i| {
            let t = if num_sources == 1 {
                0.5
            } else {
                0.25 + 0.5 * i as f64 / (num_sources - 1) as f64
            };
            Source {
                position: vec![length * t; dimension],
                amplitude: alpha_0,
                phase: i as u64,
            }
        })
        .collect()
}

/// Whether a source with phase tag `phase` fires on `tick`.
#[allow(clippy::modulo_one)]
pub fn phase_gate_open(gate: PhaseGate, tick: u64, phase: u64) -> bool {
    match gate {
        // Modulus by one: true for every integer tick.
        PhaseGate::Literal => tick % 1 == phase % 1,
        PhaseGate::Period(p) => p > 0 && tick % p == phase % p,
    }
}

/// Sources with their grid cells resolved against one geometry.
#[derive(Debug, Clone)]
pub struct SourceSchedule {
    sources: Vec<Source>,
    emissions: Vec<Emission>,
    gate: PhaseGate,
}

impl SourceSchedule {
    pub fn new(geometry: &GridGeometry, sources: Vec<Source>, gate: PhaseGate) -> PofResult<Self> {
        let dim = geometry.dimension();
        let mut emissions = Vec::with_capacity(sources.len());
        for (i, s) in sources.iter().enumerate() {
            if s.position.len() != dim {
                return Err(PofError::Configuration(format!(
                    "source {i} has {} coordinates, grid has {dim} axes",
                    s.position.len()
                )));
            }
            let index = geometry.cell_index(&s.position);
            let cell = geometry.flat_index(&index);
            emissions.push(Emission {
                index,
                cell,
                amplitude: s.amplitude,
            });
        }
        Ok(Self {
            sources,
            emissions,
            gate,
        })
    }

    /// Build from configuration; factory placements use `alpha_0` as the
    /// base amplitude of every source.
    pub fn from_config(
        geometry: &GridGeometry,
        config: &SourceConfig,
        alpha_0: f64,
    ) -> PofResult<Self> {
        let dim = geometry.dimension();
        let length = geometry.length();
        let sources = match &config.placement {
            Placement::Symmetric => symmetric_sources(config.num_sources, dim, length, alpha_0),
            Placement::Clustered => clustered_sources(config.num_sources, dim, length, alpha_0),
            Placement::Explicit(list) => list.clone(),
        };
        Self::new(geometry, sources, config.phase_gate)
    }

    /// Emissions of every source whose phase tag passes the gate on `tick`.
    ///
    /// The tick loop passes the 1-based PoF index, so `PhaseGate::Period`
    /// alternates sources across successive PoF ticks.
    pub fn get_emissions(&self, tick: u64) -> Vec<Emission> {
        self.sources
            .iter()
            .zip(&self.emissions)
            .filter(|(s, _)| phase_gate_open(self.gate, tick, s.phase))
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn gate(&self) -> PhaseGate {
        self.gate
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
