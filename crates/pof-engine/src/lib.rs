// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Deterministic tick loop wiring the root substrate, the PoF phase
//! clock, the source schedule, the wave field and the salience
//! accumulator.
//!
//! Architecture:
//!   - RootSubstrate: linear state `x`, Euler-integrated every tick
//!   - TickPhaseGenerator: phase staircase emitting PoF ticks
//!   - SourceSchedule: gated point emissions on PoF ticks
//!   - WaveField: damped leapfrog on a periodic N-D grid
//!   - SalienceAccumulator: `Psi` integration with hard-reset commits
//!   - Orchestrator: step / run / run_ticks and summary statistics

pub mod orchestrator;

pub use orchestrator::{resolve_dt, Orchestrator, TickOutcome};
