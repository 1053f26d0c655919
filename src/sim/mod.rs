//! Standalone intersection simulation engine
//!
//! This module contains all the core simulation logic: the vehicle
//! population, the traffic-light state machine, the rule-priority agent,
//! the grid path planner, and the metrics sinks. It runs headless and can
//! be exercised from the console or from tests without any transport
//! layer.

mod agent;
mod config;
mod engine;
mod error;
mod handle;
mod lights;
mod metrics;
mod output;
mod planner;
mod population;
mod types;
mod vehicle;

pub use agent::{Decision, DecisionRule, RuleAgent, DECISION_HISTORY_CAP};
pub use config::SimConfig;
pub use engine::{EngineState, LightView, SimEngine, VehicleView};
pub use error::{EngineError, EngineResult};
pub use handle::SimHandle;
pub use lights::{LightController, YELLOW_TIME};
pub use metrics::{MetricsRecorder, MetricsSnapshot, Summary, METRICS_HISTORY_CAP};
pub use output::CsvLog;
pub use planner::{GridPos, PathPlanner};
pub use population::{KindCounts, Perception, VehiclePopulation, VehicleStats};
pub use types::{
    Axis, Direction, LightColor, PerDirection, Position, RunStatus, VehicleId, VehicleKind,
    EXIT_MARGIN, LANE_OFFSET, SPEED_SCALE, WORLD_HEIGHT, WORLD_WIDTH,
};
pub use vehicle::{spawn_position, Vehicle};
