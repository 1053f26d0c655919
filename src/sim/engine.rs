//! Simulation engine: lifecycle, tick sequencing, and state queries
//!
//! One tick runs the fixed sequence: spawn, perceive, decide, advance the
//! lights, advance the vehicles, record metrics. Configuration updates
//! are validated at the boundary and staged until the next tick, so a
//! rejected update never leaves a tick half-applied.

use log::info;

use super::agent::{Decision, RuleAgent};
use super::config::SimConfig;
use super::error::{EngineError, EngineResult};
use super::lights::LightController;
use super::metrics::{MetricsRecorder, MetricsSnapshot, Summary};
use super::population::{VehiclePopulation, VehicleStats};
use super::types::{Direction, LightColor, Position, RunStatus, VehicleId, VehicleKind};

/// Read-only view of one active vehicle, for transports and dashboards.
#[derive(Debug, Clone)]
pub struct VehicleView {
    pub id: VehicleId,
    pub kind: VehicleKind,
    pub direction: Direction,
    pub lane: u8,
    pub position: Position,
    pub waiting: bool,
    pub wait_time: f64,
    pub crossed: bool,
    pub priority: u8,
}

/// Read-only view of the traffic-light state.
#[derive(Debug, Clone)]
pub struct LightView {
    pub north_south: LightColor,
    pub east_west: LightColor,
    pub time_remaining: f64,
    pub emergency_mode: bool,
    pub emergency_direction: Option<Direction>,
}

/// Whole-tick-consistent snapshot of the engine for external callers.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub sim_time: f64,
    pub status: RunStatus,
    pub vehicles: Vec<VehicleView>,
    pub lights: LightView,
    pub last_decision: Option<Decision>,
    pub metrics: Option<MetricsSnapshot>,
}

/// The simulation engine
///
/// Single-threaded: one `step` call advances everything once. Shared
/// access from concurrent callers goes through
/// [`SimHandle`](super::handle::SimHandle).
pub struct SimEngine {
    config: SimConfig,
    /// Staged by `update_config`, applied at the start of the next tick.
    pending_config: Option<SimConfig>,
    status: RunStatus,
    sim_time: f64,
    population: VehiclePopulation,
    lights: LightController,
    agent: RuleAgent,
    recorder: MetricsRecorder,
}

impl SimEngine {
    pub fn new(config: SimConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self::new_internal(config, VehiclePopulation::new()))
    }

    /// Create an engine with a seeded RNG for reproducible runs.
    pub fn with_seed(config: SimConfig, seed: u64) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self::new_internal(config, VehiclePopulation::with_seed(seed)))
    }

    fn new_internal(config: SimConfig, population: VehiclePopulation) -> Self {
        let lights = LightController::new(config.green_time);
        Self {
            config,
            pending_config: None,
            status: RunStatus::Idle,
            sim_time: 0.0,
            population,
            lights,
            agent: RuleAgent::new(),
            recorder: MetricsRecorder::new(),
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn lights(&self) -> &LightController {
        &self.lights
    }

    pub fn population(&self) -> &VehiclePopulation {
        &self.population
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    pub fn start(&mut self) -> EngineResult<RunStatus> {
        match self.status {
            RunStatus::Idle | RunStatus::Stopped => {
                self.status = RunStatus::Running;
                info!("simulation started at {:.1}s", self.sim_time);
                Ok(self.status)
            }
            status => Err(EngineError::Lifecycle { op: "start", status }),
        }
    }

    pub fn pause(&mut self) -> EngineResult<RunStatus> {
        match self.status {
            RunStatus::Running => {
                self.status = RunStatus::Paused;
                Ok(self.status)
            }
            status => Err(EngineError::Lifecycle { op: "pause", status }),
        }
    }

    pub fn resume(&mut self) -> EngineResult<RunStatus> {
        match self.status {
            RunStatus::Paused => {
                self.status = RunStatus::Running;
                Ok(self.status)
            }
            status => Err(EngineError::Lifecycle { op: "resume", status }),
        }
    }

    pub fn stop(&mut self) -> EngineResult<RunStatus> {
        match self.status {
            RunStatus::Running | RunStatus::Paused => {
                self.status = RunStatus::Stopped;
                info!(
                    "simulation stopped at {:.1}s, {} vehicles spawned",
                    self.sim_time,
                    self.population.spawned_total()
                );
                Ok(self.status)
            }
            status => Err(EngineError::Lifecycle { op: "stop", status }),
        }
    }

    /// Discard all engine state and return to a fresh idle instance with
    /// default configuration.
    pub fn reset(&mut self) -> RunStatus {
        info!("simulation reset");
        *self = Self::new_internal(SimConfig::default(), VehiclePopulation::new());
        self.status
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance the whole engine by one `dt`-second tick.
    ///
    /// A no-op while paused; an error before `start` or after `stop`.
    pub fn step(&mut self, dt: f64) -> EngineResult<()> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(EngineError::InvalidStep(dt));
        }
        match self.status {
            RunStatus::Running => {}
            RunStatus::Paused => return Ok(()),
            status => return Err(EngineError::Lifecycle { op: "step", status }),
        }

        if let Some(config) = self.pending_config.take() {
            self.config = config;
        }

        self.sim_time += dt;

        let _ = self.population.maybe_spawn(dt, self.sim_time, &self.config);

        let perception = self.population.perceive();
        self.agent
            .decide(self.sim_time, &perception, &mut self.lights, &self.config);

        self.lights.advance(dt, self.config.green_time);

        let lights = &self.lights;
        self.population.advance(dt, |direction| lights.can_go(direction));

        let snapshot = self.snapshot();
        self.recorder.record(snapshot);

        Ok(())
    }

    fn snapshot(&self) -> MetricsSnapshot {
        let perception = self.population.perceive();
        MetricsSnapshot {
            timestamp: self.sim_time,
            active_vehicles: self.population.active_count(),
            spawned_total: self.population.spawned_total(),
            crossed_total: self.population.crossed_total(),
            queues: perception.queues,
            mean_wait: self.population.mean_wait(),
            north_south: self.lights.axis_color(super::types::Axis::NorthSouth),
            east_west: self.lights.axis_color(super::types::Axis::EastWest),
            emergency_active: self.lights.emergency_mode(),
        }
    }

    // ── Mutating control calls ────────────────────────────────────────────

    /// Validate and stage a new configuration; it takes effect at the
    /// start of the next tick. The engine is untouched on rejection.
    pub fn update_config(&mut self, config: SimConfig) -> EngineResult<()> {
        config.validate()?;
        self.pending_config = Some(config);
        Ok(())
    }

    /// Insert one emergency vehicle, bypassing the normal spawn draw.
    pub fn spawn_emergency_vehicle(&mut self) -> (VehicleId, Direction) {
        self.population.spawn_emergency(self.sim_time)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Whole-tick-consistent state for transports and dashboards.
    pub fn state(&self) -> EngineState {
        let vehicles = self
            .population
            .active()
            .iter()
            .map(|vehicle| VehicleView {
                id: vehicle.id,
                kind: vehicle.kind,
                direction: vehicle.direction,
                lane: vehicle.lane,
                position: vehicle.position,
                waiting: vehicle.waiting,
                wait_time: vehicle.wait_time,
                crossed: vehicle.crossed,
                priority: vehicle.kind.priority(),
            })
            .collect();

        EngineState {
            sim_time: self.sim_time,
            status: self.status,
            vehicles,
            lights: LightView {
                north_south: self.lights.axis_color(super::types::Axis::NorthSouth),
                east_west: self.lights.axis_color(super::types::Axis::EastWest),
                time_remaining: self.lights.time_remaining(),
                emergency_mode: self.lights.emergency_mode(),
                emergency_direction: self.lights.emergency_direction(),
            },
            last_decision: self.agent.last_decision().cloned(),
            metrics: self.recorder.latest().cloned(),
        }
    }

    pub fn latest_snapshot(&self) -> Option<&MetricsSnapshot> {
        self.recorder.latest()
    }

    pub fn last_decision(&self) -> Option<&Decision> {
        self.agent.last_decision()
    }

    /// Human-readable summary of the latest agent decision.
    pub fn current_decision_summary(&self) -> &str {
        self.agent.current_summary()
    }

    /// Whole-run aggregation; [`EngineError::NoData`] before the first
    /// tick.
    pub fn summary(&self) -> EngineResult<Summary> {
        self.recorder.summary().ok_or(EngineError::NoData)
    }

    /// The full session log; [`EngineError::NoData`] before the first
    /// tick.
    pub fn timeseries(&self) -> EngineResult<&[MetricsSnapshot]> {
        let log = self.recorder.session_log();
        if log.is_empty() {
            return Err(EngineError::NoData);
        }
        Ok(log)
    }

    /// The decision ring buffer, oldest first; [`EngineError::NoData`]
    /// before the first decision.
    pub fn decision_history(&self) -> EngineResult<Vec<Decision>> {
        if self.agent.history_len() == 0 {
            return Err(EngineError::NoData);
        }
        Ok(self.agent.history().cloned().collect())
    }

    /// Cumulative vehicle tallies; [`EngineError::NoData`] before the
    /// first spawn.
    pub fn vehicle_stats(&self) -> EngineResult<VehicleStats> {
        if self.population.spawned_total() == 0 {
            return Err(EngineError::NoData);
        }
        Ok(self.population.stats())
    }
}
