//! Core types for the intersection simulation
//!
//! These are standalone value types shared by every engine component.

use std::fmt;
use std::ops::{Index, IndexMut};

/// A unique identifier for a vehicle
/// Monotonically increasing for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub u64);

/// Travel heading of a vehicle, named after the compass direction it
/// moves toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Fixed iteration order used by the rule agent and all aggregations.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// The traffic-light axis that controls this heading.
    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::NorthSouth,
            Direction::East | Direction::West => Axis::EastWest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the two perpendicular traffic-light groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

/// Color of one traffic-light axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightColor {
    Green,
    Yellow,
    Red,
}

impl LightColor {
    pub fn label(self) -> &'static str {
        match self {
            LightColor::Green => "green",
            LightColor::Yellow => "yellow",
            LightColor::Red => "red",
        }
    }
}

impl fmt::Display for LightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of vehicle in the simulation
/// Speed, footprint, and priority weight are fixed per kind and assigned
/// once at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleKind {
    Car,
    Bus,
    Truck,
    Emergency,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 4] = [
        VehicleKind::Car,
        VehicleKind::Bus,
        VehicleKind::Truck,
        VehicleKind::Emergency,
    ];

    /// Base speed in grid units per scaled second.
    pub fn speed(self) -> f64 {
        match self {
            VehicleKind::Car => 2.0,
            VehicleKind::Bus => 1.2,
            VehicleKind::Truck => 1.0,
            VehicleKind::Emergency => 3.5,
        }
    }

    /// Footprint in world units, used by rendering consumers.
    pub fn size(self) -> f64 {
        match self {
            VehicleKind::Car => 15.0,
            VehicleKind::Bus => 25.0,
            VehicleKind::Truck => 20.0,
            VehicleKind::Emergency => 20.0,
        }
    }

    /// Priority weight; only `Emergency` is special-cased by the agent.
    pub fn priority(self) -> u8 {
        match self {
            VehicleKind::Car => 1,
            VehicleKind::Bus => 2,
            VehicleKind::Truck => 1,
            VehicleKind::Emergency => 10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleKind::Car => "car",
            VehicleKind::Bus => "bus",
            VehicleKind::Truck => "truck",
            VehicleKind::Emergency => "emergency",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A 2D position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A value held per compass direction, indexable by [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerDirection<T> {
    pub north: T,
    pub south: T,
    pub east: T,
    pub west: T,
}

impl<T> Index<Direction> for PerDirection<T> {
    type Output = T;

    fn index(&self, direction: Direction) -> &T {
        match direction {
            Direction::North => &self.north,
            Direction::South => &self.south,
            Direction::East => &self.east,
            Direction::West => &self.west,
        }
    }
}

impl<T> IndexMut<Direction> for PerDirection<T> {
    fn index_mut(&mut self, direction: Direction) -> &mut T {
        match direction {
            Direction::North => &mut self.north,
            Direction::South => &mut self.south,
            Direction::East => &mut self.east,
            Direction::West => &mut self.west,
        }
    }
}

/// Lifecycle state of the simulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Constructed, never started.
    Idle,
    Running,
    Paused,
    Stopped,
}

impl RunStatus {
    pub fn label(self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Paused => "paused",
            RunStatus::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Width of the simulated world in world units (east-west extent)
pub const WORLD_WIDTH: f64 = 1400.0;

/// Height of the simulated world in world units (north-south extent)
pub const WORLD_HEIGHT: f64 = 900.0;

/// Distance past the far boundary at which a vehicle counts as crossed
pub const EXIT_MARGIN: f64 = 50.0;

/// Cross-axis offset between the two lanes of one approach
pub const LANE_OFFSET: f64 = 25.0;

/// World units travelled per second at kind speed 1.0
pub const SPEED_SCALE: f64 = 60.0;
