//! Shared engine handle with a background tick loop
//!
//! The engine itself is single-threaded; this wrapper gives concurrent
//! callers a safe surface. One mutex guards the whole engine: the tick
//! thread holds it for the duration of each tick, and every query or
//! control call takes the same lock, so readers always observe state
//! belonging to exactly one tick. The loop checks the run status at the
//! start of each iteration and exits cooperatively, never aborting a tick
//! mid-update.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use super::agent::Decision;
use super::config::SimConfig;
use super::engine::{EngineState, SimEngine};
use super::error::{EngineError, EngineResult};
use super::metrics::{MetricsSnapshot, Summary};
use super::population::VehicleStats;
use super::types::{Direction, RunStatus, VehicleId};

pub struct SimHandle {
    engine: Arc<Mutex<SimEngine>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl SimHandle {
    pub fn new(config: SimConfig) -> EngineResult<Self> {
        Ok(Self {
            engine: Arc::new(Mutex::new(SimEngine::new(config)?)),
            worker: None,
        })
    }

    /// Create a handle around a seeded engine for reproducible runs.
    pub fn with_seed(config: SimConfig, seed: u64) -> EngineResult<Self> {
        Ok(Self {
            engine: Arc::new(Mutex::new(SimEngine::with_seed(config, seed)?)),
            worker: None,
        })
    }

    fn lock(&self) -> MutexGuard<'_, SimEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the engine and spawn the tick thread, advancing `dt` seconds
    /// of simulated time every `dt` seconds of wall time.
    pub fn start(&mut self, dt: f64) -> EngineResult<RunStatus> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(EngineError::InvalidStep(dt));
        }

        let status = self.lock().start()?;

        let engine = Arc::clone(&self.engine);
        let period = Duration::from_secs_f64(dt);
        self.worker = Some(thread::spawn(move || loop {
            {
                let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
                match engine.status() {
                    RunStatus::Running => {
                        // Status was checked above; step cannot reject.
                        let _ = engine.step(dt);
                    }
                    RunStatus::Paused => {}
                    RunStatus::Idle | RunStatus::Stopped => break,
                }
            }
            thread::sleep(period);
        }));

        Ok(status)
    }

    /// Freeze tick advancement without touching any state.
    pub fn pause(&self) -> EngineResult<RunStatus> {
        self.lock().pause()
    }

    pub fn resume(&self) -> EngineResult<RunStatus> {
        self.lock().resume()
    }

    /// Stop the engine and join the tick thread.
    pub fn stop(&mut self) -> EngineResult<RunStatus> {
        let status = self.lock().stop()?;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        Ok(status)
    }

    /// Discard all engine state. Stops a live tick thread first, so the
    /// reset never races an in-flight tick.
    pub fn reset(&mut self) -> RunStatus {
        {
            let mut engine = self.lock();
            // Already-stopped engines reject stop; that is fine here.
            let _ = engine.stop();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.lock().reset()
    }

    // ── Queries and mutating control calls ────────────────────────────────

    pub fn status(&self) -> RunStatus {
        self.lock().status()
    }

    pub fn state(&self) -> EngineState {
        self.lock().state()
    }

    pub fn config(&self) -> SimConfig {
        self.lock().config().clone()
    }

    pub fn update_config(&self, config: SimConfig) -> EngineResult<()> {
        self.lock().update_config(config)
    }

    pub fn spawn_emergency_vehicle(&self) -> (VehicleId, Direction) {
        self.lock().spawn_emergency_vehicle()
    }

    pub fn summary(&self) -> EngineResult<Summary> {
        self.lock().summary()
    }

    pub fn timeseries(&self) -> EngineResult<Vec<MetricsSnapshot>> {
        self.lock().timeseries().map(<[MetricsSnapshot]>::to_vec)
    }

    pub fn decision_history(&self) -> EngineResult<Vec<Decision>> {
        self.lock().decision_history()
    }

    pub fn vehicle_stats(&self) -> EngineResult<VehicleStats> {
        self.lock().vehicle_stats()
    }
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            {
                let mut engine = self.lock();
                let _ = engine.stop();
            }
            let _ = worker.join();
        }
    }
}
