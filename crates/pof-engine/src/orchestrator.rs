// ─────────────────────────────────────────────────────────────────────
// PoF Kernel — Orchestrator (Tick Loop)
// ─────────────────────────────────────────────────────────────────────
//! One deterministic tick:
//!   1. RootSubstrate Euler step
//!   2. Clock drive F_val (constant or ‖x‖)
//!   3. TickPhaseGenerator update, possibly a PoF tick
//!   4. On a PoF tick: sources gated on the PoF index, each emitting
//!      `alpha_0 + alpha_1·‖x‖`
//!   5. WaveField step (every tick, with or without emissions)
//!   6. On a PoF tick: Agent samples the stepped field

use serde::{Deserialize, Serialize};

use pof_observers::SalienceAccumulator;
use pof_physics::{
    adaptive_dt, GridGeometry, RootSubstrate, SourceSchedule, TickPhaseGenerator, WaveField,
};
use pof_types::{
    AgentCommit, ClockDrive, CommitEvent, EngineConfig, PofError, PofResult, PofTick, RunReport,
    RunSummary, TimeStep,
};

/// What happened on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// 0-based index of the tick just executed.
    pub tick: u64,
    /// Field time after the step.
    pub time: f64,
    pub pof: Option<PofTick>,
    pub agent_commit: Option<AgentCommit>,
}

impl TickOutcome {
    /// Commit events of this tick, PoF tick first.
    pub fn events(&self) -> Vec<CommitEvent> {
        let mut out = Vec::with_capacity(2);
        if let Some(p) = &self.pof {
            out.push(CommitEvent::Pof(p.clone()));
        }
        if let Some(a) = &self.agent_commit {
            out.push(CommitEvent::Agent(a.clone()));
        }
        out
    }
}

/// Resolve the time step from the configured policy.
pub fn resolve_dt(config: &EngineConfig) -> PofResult<f64> {
    match config.time_step {
        TimeStep::Fixed(dt) => Ok(dt),
        TimeStep::Adaptive {
            cfl_factor,
            dt_min,
            dt_max,
        } => {
            let geometry = GridGeometry::from_config(&config.field)?;
            adaptive_dt(
                geometry.dimension(),
                cfl_factor,
                geometry.min_dx(),
                config.field.wave_speed,
                dt_min,
                dt_max,
            )
        }
    }
}

/// Owns one instance of every component for a single run.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    cfg: EngineConfig,
    field: WaveField,
    schedule: SourceSchedule,
    substrate: RootSubstrate,
    clock: TickPhaseGenerator,
    agent: SalienceAccumulator,
    tick: u64,
    truncated: bool,
}

impl Orchestrator {
    /// Validate the configuration and build every component.
    ///
    /// Fails with `PofError::Configuration` on any invalid value,
    /// including a CFL violation; sweep drivers should skip such points.
    pub fn new(config: EngineConfig) -> PofResult<Self> {
        config.validate()?;
        let dt = resolve_dt(&config)?;
        let field = WaveField::new(&config.field, dt)?;
        let schedule =
            SourceSchedule::from_config(field.geometry(), &config.sources, config.emission.alpha_0)?;
        let substrate = RootSubstrate::from_config(&config.substrate)?;
        let clock = TickPhaseGenerator::new(config.clock.delta);
        let agent = SalienceAccumulator::new(&config.agent, config.record_mode);

        log::debug!(
            "orchestrator: dt={dt} sources={} alpha_0={} alpha_1={} threshold={}",
            schedule.len(),
            config.emission.alpha_0,
            config.emission.alpha_1,
            agent.threshold()
        );

        Ok(Self {
            cfg: config,
            field,
            schedule,
            substrate,
            clock,
            agent,
            tick: 0,
            truncated: false,
        })
    }

    /// Execute one tick.
    pub fn step(&mut self) -> TickOutcome {
        let tick = self.tick;
        let dt = self.field.dt();
        let t_before = self.field.time();

        // 1–3. Substrate, drive, clock
        self.substrate.step(dt);
        let f_val = match self.cfg.clock.drive {
            ClockDrive::Constant(f) => f,
            ClockDrive::SubstrateNorm => self.substrate.norm(),
        };
        let crossing = self.clock.update(self.cfg.clock.omega_p, f_val, dt);

        // 4. Emissions for this tick
        let alpha_1 = self.cfg.emission.alpha_1;
        let mut emissions = Vec::new();
        let pof = crossing.map(|c| {
            // Every gated source deposits the clock amplitude.
            let amplitude = self
                .substrate
                .emission_amplitude(self.cfg.emission.alpha_0, alpha_1);
            emissions = self.schedule.get_emissions(c.index);
            for e in emissions.iter_mut() {
                e.amplitude = amplitude;
            }
            log::debug!(
                "PoF tick #{} at tick {tick} (t={t_before:.4}, theta={:.4}, amplitude={amplitude})",
                c.index,
                c.theta
            );
            PofTick {
                index: c.index,
                tick,
                theta: c.theta,
                rung: c.rung,
                amplitude,
            }
        });

        // 5. Field
        self.field.step(&emissions);
        let time = self.field.time();

        // 6. Agent
        let agent_commit = if pof.is_some() {
            self.agent.on_pof_tick(tick, time, &self.field)
        } else {
            None
        };

        self.tick += 1;
        TickOutcome {
            tick,
            time,
            pof,
            agent_commit,
        }
    }

    /// Step while field time `< t_end`, bounded by `max_ticks` if set.
    pub fn run(&mut self, t_end: f64) -> PofResult<RunReport> {
        if t_end.is_nan() || (t_end == f64::INFINITY && self.cfg.max_ticks.is_none()) {
            return Err(PofError::Numerical(format!(
                "run horizon must be finite or bounded by max_ticks, got {t_end}"
            )));
        }
        log::info!(
            "run: T={t_end} dt={} grid={:?}",
            self.field.dt(),
            self.field.geometry().shape()
        );

        while self.field.time() < t_end {
            if self.cfg.max_ticks.is_some_and(|max| self.tick >= max) {
                self.truncated = true;
                log::info!("run: tick budget exhausted at t={:.4}", self.field.time());
                break;
            }
            self.step();
        }

        let report = self.report();
        log::info!(
            "run: done t={:.4} ticks={} pof={} commits={} psi={:.6}",
            report.summary.final_time,
            report.summary.sim_ticks,
            report.summary.tick_count,
            report.summary.commit_count,
            report.summary.final_psi
        );
        Ok(report)
    }

    /// Execute exactly `n` ticks regardless of time.
    pub fn run_ticks(&mut self, n: u64) -> RunReport {
        for _ in 0..n {
            self.step();
        }
        self.report()
    }

    /// Summary statistics of everything run so far.
    pub fn summary(&self) -> RunSummary {
        let final_time = self.field.time();
        let commit_count = self.agent.commit_count();
        let threshold = self.agent.threshold();
        let final_psi = self.agent.psi();
        RunSummary {
            sim_ticks: self.tick,
            final_time,
            tick_count: self.agent.tick_count(),
            sample_count: self.agent.sample_count(),
            commit_count,
            first_commit_time: self.agent.first_commit_time(),
            last_commit_time: self.agent.last_commit_time(),
            commit_rate: if final_time > 0.0 {
                commit_count as f64 / final_time
            } else {
                0.0
            },
            max_salience: self.agent.max_salience(),
            final_psi,
            psi_threshold: threshold,
            psi_deficit: (threshold - final_psi).max(0.0),
            truncated: self.truncated,
        }
    }

    /// Summary plus the per-sample history when recording in full.
    pub fn report(&self) -> RunReport {
        RunReport {
            summary: self.summary(),
            history: self.agent.history().map(<[_]>::to_vec),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    pub fn schedule(&self) -> &SourceSchedule {
        &self.schedule
    }

    pub fn substrate(&self) -> &RootSubstrate {
        &self.substrate
    }

    pub fn clock(&self) -> &TickPhaseGenerator {
        &self.clock
    }

    pub fn agent(&self) -> &SalienceAccumulator {
        &self.agent
    }

    /// Ticks executed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn dt(&self) -> f64 {
        self.field.dt()
    }

    pub fn time(&self) -> f64 {
        self.field.time()
    }
}
