//! Metrics collection and aggregation
//!
//! Every tick produces one [`MetricsSnapshot`], fed to two sinks: a
//! bounded ring buffer for recent-window queries and an append-only
//! session log for whole-run analytics. The session log is bounded only
//! by the run's lifetime; callers needing rotation persist it through
//! [`CsvLog`](super::output::CsvLog) and reset the engine.

use std::collections::VecDeque;

use super::types::{LightColor, PerDirection};

/// Capacity of the recent-window ring buffer.
pub const METRICS_HISTORY_CAP: usize = 1000;

/// One tick's worth of aggregated engine state.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Simulation time in seconds.
    pub timestamp: f64,
    pub active_vehicles: usize,
    pub spawned_total: u64,
    pub crossed_total: u64,
    pub queues: PerDirection<usize>,
    /// Mean cumulative wait across active vehicles.
    pub mean_wait: f64,
    pub north_south: LightColor,
    pub east_west: LightColor,
    pub emergency_active: bool,
}

/// Whole-run aggregation over the session log.
#[derive(Debug, Clone)]
pub struct Summary {
    pub total_vehicles_spawned: u64,
    pub total_crossed: u64,
    pub total_sim_time: f64,
    /// Mean of the per-tick mean wait.
    pub average_wait: f64,
    /// Peak of the per-tick mean wait.
    pub peak_wait: f64,
    pub average_queues: PerDirection<f64>,
    pub peak_queue: usize,
    /// Number of ticks spent in emergency override.
    pub emergency_ticks: usize,
    /// Crossed vehicles per minute of simulated time.
    pub throughput_per_minute: f64,
}

#[derive(Debug, Default)]
pub struct MetricsRecorder {
    recent: VecDeque<MetricsSnapshot>,
    session: Vec<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one snapshot to both sinks, evicting the oldest recent
    /// entry on overflow.
    pub fn record(&mut self, snapshot: MetricsSnapshot) {
        if self.recent.len() == METRICS_HISTORY_CAP {
            self.recent.pop_front();
        }
        self.recent.push_back(snapshot.clone());
        self.session.push(snapshot);
    }

    pub fn latest(&self) -> Option<&MetricsSnapshot> {
        self.session.last()
    }

    /// The recent window, oldest first, at most [`METRICS_HISTORY_CAP`]
    /// entries.
    pub fn recent(&self) -> &VecDeque<MetricsSnapshot> {
        &self.recent
    }

    /// The full session log, oldest first.
    pub fn session_log(&self) -> &[MetricsSnapshot] {
        &self.session
    }

    /// Aggregate the session log; `None` before the first tick.
    pub fn summary(&self) -> Option<Summary> {
        let last = self.session.last()?;
        let ticks = self.session.len() as f64;

        let mut wait_sum = 0.0;
        let mut peak_wait = 0.0f64;
        let mut queue_sums = PerDirection::<f64>::default();
        let mut peak_queue = 0usize;
        let mut emergency_ticks = 0usize;

        for snapshot in &self.session {
            wait_sum += snapshot.mean_wait;
            peak_wait = peak_wait.max(snapshot.mean_wait);
            for direction in super::types::Direction::ALL {
                let queue = snapshot.queues[direction];
                queue_sums[direction] += queue as f64;
                peak_queue = peak_queue.max(queue);
            }
            if snapshot.emergency_active {
                emergency_ticks += 1;
            }
        }

        let mut average_queues = PerDirection::<f64>::default();
        for direction in super::types::Direction::ALL {
            average_queues[direction] = queue_sums[direction] / ticks;
        }

        let throughput_per_minute = if last.timestamp > 0.0 {
            last.crossed_total as f64 / (last.timestamp / 60.0)
        } else {
            0.0
        };

        Some(Summary {
            total_vehicles_spawned: last.spawned_total,
            total_crossed: last.crossed_total,
            total_sim_time: last.timestamp,
            average_wait: wait_sum / ticks,
            peak_wait,
            average_queues,
            peak_queue,
            emergency_ticks,
            throughput_per_minute,
        })
    }
}
