//! Vehicle population: spawning, movement, and perception
//!
//! Owns the active vehicle set exclusively. Crossed vehicles are pruned
//! the tick they cross; the cumulative counters keep their contribution
//! forever.

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::SimConfig;
use super::types::{Direction, PerDirection, VehicleId, VehicleKind};
use super::vehicle::Vehicle;

/// Per-tick derived summary of the population, consumed by the rule agent.
///
/// Recomputed from the vehicle set every tick; never cached across ticks.
#[derive(Debug, Clone, Default)]
pub struct Perception {
    /// Active vehicles per heading.
    pub queues: PerDirection<usize>,
    /// Mean cumulative wait per heading, zero for an empty queue.
    pub mean_waits: PerDirection<f64>,
    /// Heading of the longest-waiting emergency vehicle that is currently
    /// held at a red light, if any.
    pub emergency: Option<Direction>,
}

/// Cumulative spawn tallies per vehicle kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub cars: u64,
    pub buses: u64,
    pub trucks: u64,
    pub emergencies: u64,
}

impl KindCounts {
    fn bump(&mut self, kind: VehicleKind) {
        match kind {
            VehicleKind::Car => self.cars += 1,
            VehicleKind::Bus => self.buses += 1,
            VehicleKind::Truck => self.trucks += 1,
            VehicleKind::Emergency => self.emergencies += 1,
        }
    }
}

/// Aggregated vehicle statistics for external analytics.
#[derive(Debug, Clone)]
pub struct VehicleStats {
    pub spawned_total: u64,
    pub active: usize,
    pub crossed_total: u64,
    pub by_kind: KindCounts,
    pub by_direction: PerDirection<u64>,
}

/// The set of active vehicles plus the RNG that drives spawning.
pub struct VehiclePopulation {
    vehicles: Vec<Vehicle>,
    next_id: u64,
    spawned_total: u64,
    crossed_total: u64,
    kind_counts: KindCounts,
    direction_counts: PerDirection<u64>,
    /// Optional seeded RNG for reproducible simulations.
    rng: Option<StdRng>,
}

impl Default for VehiclePopulation {
    fn default() -> Self {
        Self::new()
    }
}

impl VehiclePopulation {
    pub fn new() -> Self {
        Self::new_internal(None)
    }

    /// Create a population with a seeded RNG for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::new_internal(Some(StdRng::seed_from_u64(seed)))
    }

    fn new_internal(rng: Option<StdRng>) -> Self {
        Self {
            vehicles: Vec::new(),
            next_id: 0,
            spawned_total: 0,
            crossed_total: 0,
            kind_counts: KindCounts::default(),
            direction_counts: PerDirection::default(),
            rng,
        }
    }

    fn roll(&mut self) -> f64 {
        match &mut self.rng {
            Some(rng) => rng.random(),
            None => rand::rng().random(),
        }
    }

    fn roll_index(&mut self, n: usize) -> usize {
        match &mut self.rng {
            Some(rng) => rng.random_range(0..n),
            None => rand::rng().random_range(0..n),
        }
    }

    /// Probabilistic spawn draw for one tick: a vehicle arrives with
    /// probability `dt / spawn_rate`.
    pub fn maybe_spawn(&mut self, dt: f64, now: f64, config: &SimConfig) -> Option<VehicleId> {
        if self.roll() < dt / config.spawn_rate {
            self.spawn(now, config)
        } else {
            None
        }
    }

    /// Spawn one vehicle with a drawn kind, heading, and lane.
    ///
    /// Rejected while the active population is at the configured ceiling.
    pub fn spawn(&mut self, now: f64, config: &SimConfig) -> Option<VehicleId> {
        if self.vehicles.len() >= config.max_vehicles {
            return None;
        }

        let kind = self.draw_kind();
        let direction = Direction::ALL[self.roll_index(4)];
        Some(self.insert(kind, direction, now))
    }

    /// Insert one emergency vehicle directly, bypassing the kind draw and
    /// the population ceiling.
    pub fn spawn_emergency(&mut self, now: f64) -> (VehicleId, Direction) {
        let direction = Direction::ALL[self.roll_index(4)];
        let id = self.insert(VehicleKind::Emergency, direction, now);
        (id, direction)
    }

    fn insert(&mut self, kind: VehicleKind, direction: Direction, now: f64) -> VehicleId {
        self.next_id += 1;
        let id = VehicleId(self.next_id);
        let lane = self.roll_index(2) as u8;

        self.spawned_total += 1;
        self.kind_counts.bump(kind);
        self.direction_counts[direction] += 1;

        self.vehicles.push(Vehicle::new(id, kind, direction, lane, now));
        id
    }

    /// Categorical kind draw: emergency 5%, bus 15%, truck 15%, car 65%.
    fn draw_kind(&mut self) -> VehicleKind {
        let roll = self.roll();
        if roll < 0.05 {
            VehicleKind::Emergency
        } else if roll < 0.20 {
            VehicleKind::Bus
        } else if roll < 0.35 {
            VehicleKind::Truck
        } else {
            VehicleKind::Car
        }
    }

    /// Advance every active vehicle by one tick and prune the ones that
    /// crossed the exit boundary.
    pub fn advance(&mut self, dt: f64, can_go: impl Fn(Direction) -> bool) {
        for vehicle in &mut self.vehicles {
            vehicle.step(dt, can_go(vehicle.direction));
        }

        let before = self.vehicles.len();
        self.vehicles.retain(|vehicle| !vehicle.crossed);
        self.crossed_total += (before - self.vehicles.len()) as u64;
    }

    /// Compute the perception snapshot in one O(n) pass.
    pub fn perceive(&self) -> Perception {
        let mut queues = PerDirection::<usize>::default();
        let mut wait_sums = PerDirection::<f64>::default();

        for vehicle in &self.vehicles {
            queues[vehicle.direction] += 1;
            wait_sums[vehicle.direction] += vehicle.wait_time;
        }

        let mut mean_waits = PerDirection::<f64>::default();
        for direction in Direction::ALL {
            if queues[direction] > 0 {
                mean_waits[direction] = wait_sums[direction] / queues[direction] as f64;
            }
        }

        let emergency = self
            .vehicles
            .iter()
            .filter(|vehicle| vehicle.kind == VehicleKind::Emergency && vehicle.waiting)
            .max_by_key(|vehicle| OrderedFloat(vehicle.wait_time))
            .map(|vehicle| vehicle.direction);

        Perception {
            queues,
            mean_waits,
            emergency,
        }
    }

    /// Mean cumulative wait across all active vehicles.
    pub fn mean_wait(&self) -> f64 {
        if self.vehicles.is_empty() {
            return 0.0;
        }
        let total: f64 = self.vehicles.iter().map(|vehicle| vehicle.wait_time).sum();
        total / self.vehicles.len() as f64
    }

    pub fn active(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn active_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn crossed_total(&self) -> u64 {
        self.crossed_total
    }

    pub fn stats(&self) -> VehicleStats {
        VehicleStats {
            spawned_total: self.spawned_total,
            active: self.vehicles.len(),
            crossed_total: self.crossed_total,
            by_kind: self.kind_counts,
            by_direction: self.direction_counts,
        }
    }
}
