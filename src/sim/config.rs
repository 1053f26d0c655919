//! Simulation configuration
//!
//! Validated at the boundary: `SimEngine::update_config` rejects a bad
//! config before touching any engine state.

use super::error::{EngineError, EngineResult};

/// Tunable parameters of one simulation run.
///
/// Defaults match the reference deployment: a vehicle roughly every two
/// seconds, at most 80 active vehicles, 30-second green phases.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Mean seconds between spawn attempts; each tick spawns with
    /// probability `dt / spawn_rate`.
    pub spawn_rate: f64,
    /// Ceiling on the active vehicle population.
    pub max_vehicles: usize,
    /// Green interval in seconds for each axis of the normal cycle.
    pub green_time: f64,
    /// Queue length above which the agent extends a green phase.
    pub queue_threshold: usize,
    /// Mean wait in seconds above which the agent extends a green phase.
    pub wait_threshold: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spawn_rate: 2.0,
            max_vehicles: 80,
            green_time: 30.0,
            queue_threshold: 10,
            wait_threshold: 60.0,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.spawn_rate > 0.0) || !self.spawn_rate.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "spawn_rate must be positive, got {}",
                self.spawn_rate
            )));
        }
        if self.max_vehicles == 0 {
            return Err(EngineError::InvalidConfig(
                "max_vehicles must be at least 1".to_string(),
            ));
        }
        if !(self.green_time > 0.0) || !self.green_time.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "green_time must be positive, got {}",
                self.green_time
            )));
        }
        if self.queue_threshold == 0 {
            return Err(EngineError::InvalidConfig(
                "queue_threshold must be at least 1".to_string(),
            ));
        }
        if !(self.wait_threshold > 0.0) || !self.wait_threshold.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "wait_threshold must be positive, got {}",
                self.wait_threshold
            )));
        }
        Ok(())
    }
}
