// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Physics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Damped scalar wave field on a periodic N-dimensional grid, the point
//! sources that drive it, the PoF phase clock and the linear root
//! substrate behind the clock drive.

pub mod field;
pub mod geometry;
pub mod params;
pub mod phase;
pub mod sources;
pub mod substrate;

pub use field::WaveField;
pub use geometry::GridGeometry;
pub use params::{
    adaptive_dt, cfl_factor_range, cfl_number, default_cfl_factor, dissipation_factor, CFL_LIMIT,
    ENERGY_CLAMP, FIELD_MAX,
};
pub use phase::{PhaseCrossing, TickPhaseGenerator};
pub use sources::{clustered_sources, phase_gate_open, symmetric_sources, Emission, SourceSchedule};
pub use substrate::RootSubstrate;
