// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Configuration, error hierarchy and run records shared by the
//! wave-field integrator, the phase clock and the salience accumulator.

pub mod config;
pub mod error;
pub mod record;

pub use config::{
    AgentConfig, Backend, ClockConfig, ClockDrive, DampingScheme, EmissionConfig, EngineConfig,
    FieldConfig, PhaseGate, Placement, RecordMode, SalienceMode, Source, SourceConfig,
    SubstrateConfig, TimeStep, DEFAULT_ENERGY_CLAMP, DEFAULT_FIELD_MAX,
};
pub use error::{PofError, PofResult};
pub use record::{
    AgentCommit, CommitEvent, PofTick, RunReport, RunSummary, SampleRecord,
};
