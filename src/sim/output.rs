//! Row-per-tick CSV session log
//!
//! Persists the metrics snapshot plus the decision reason for offline
//! analysis. Append-only for the lifetime of the run; retention and
//! rotation are the caller's concern.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::metrics::MetricsSnapshot;

#[derive(Debug, Serialize)]
struct TickRow<'a> {
    timestamp: f64,
    active_vehicles: usize,
    spawned_total: u64,
    crossed_total: u64,
    queue_north: usize,
    queue_south: usize,
    queue_east: usize,
    queue_west: usize,
    mean_wait: f64,
    light_ns: &'a str,
    light_ew: &'a str,
    emergency_active: bool,
    decision: &'a str,
}

pub struct CsvLog {
    writer: csv::Writer<File>,
}

impl CsvLog {
    pub fn create(path: &Path) -> Result<Self> {
        let writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create CSV log at {}", path.display()))?;
        Ok(Self { writer })
    }

    pub fn append(&mut self, snapshot: &MetricsSnapshot, decision: &str) -> Result<()> {
        self.writer
            .serialize(TickRow {
                timestamp: snapshot.timestamp,
                active_vehicles: snapshot.active_vehicles,
                spawned_total: snapshot.spawned_total,
                crossed_total: snapshot.crossed_total,
                queue_north: snapshot.queues.north,
                queue_south: snapshot.queues.south,
                queue_east: snapshot.queues.east,
                queue_west: snapshot.queues.west,
                mean_wait: snapshot.mean_wait,
                light_ns: snapshot.north_south.label(),
                light_ew: snapshot.east_west.label(),
                emergency_active: snapshot.emergency_active,
                decision,
            })
            .context("failed to write metrics row")
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("failed to flush CSV log")
    }
}
