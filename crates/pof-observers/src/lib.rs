// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Observers
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Observers of the PoF commit stream. The salience accumulator (Agent)
//! samples field energy on PoF ticks and fires its own commits.

pub mod salience;

pub use salience::{AgentState, SalienceAccumulator};
