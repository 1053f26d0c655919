//! Vehicle record and per-tick movement
//!
//! Vehicles travel in a straight line along the axis implied by their
//! heading; the population owns them exclusively.

use super::types::{
    Direction, Position, VehicleId, VehicleKind, EXIT_MARGIN, LANE_OFFSET, SPEED_SCALE,
    WORLD_HEIGHT, WORLD_WIDTH,
};

/// A vehicle in the simulation
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub kind: VehicleKind,
    pub direction: Direction,
    /// Lane index within the approach, 0 or 1.
    pub lane: u8,
    pub position: Position,
    pub waiting: bool,
    /// Cumulative seconds spent waiting; never decreases.
    pub wait_time: f64,
    pub crossed: bool,
    pub spawn_time: f64,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        kind: VehicleKind,
        direction: Direction,
        lane: u8,
        spawn_time: f64,
    ) -> Self {
        Self {
            id,
            kind,
            direction,
            lane,
            position: spawn_position(direction, lane),
            waiting: false,
            wait_time: 0.0,
            crossed: false,
            spawn_time,
        }
    }

    /// Advance this vehicle by one tick.
    ///
    /// A red axis accumulates wait time; a green axis moves the vehicle
    /// along its heading. Sets `crossed` once the position passes the far
    /// boundary by [`EXIT_MARGIN`].
    pub fn step(&mut self, dt: f64, green: bool) {
        if self.crossed {
            return;
        }

        if !green {
            self.waiting = true;
            self.wait_time += dt;
            return;
        }

        self.waiting = false;
        let distance = self.kind.speed() * dt * SPEED_SCALE;
        match self.direction {
            Direction::North => self.position.y -= distance,
            Direction::South => self.position.y += distance,
            Direction::East => self.position.x += distance,
            Direction::West => self.position.x -= distance,
        }

        if self.past_exit_boundary() {
            self.crossed = true;
        }
    }

    fn past_exit_boundary(&self) -> bool {
        match self.direction {
            Direction::North => self.position.y < -EXIT_MARGIN,
            Direction::South => self.position.y > WORLD_HEIGHT + EXIT_MARGIN,
            Direction::East => self.position.x > WORLD_WIDTH + EXIT_MARGIN,
            Direction::West => self.position.x < -EXIT_MARGIN,
        }
    }
}

/// Spawn point on the boundary edge matching the travel heading, shifted
/// sideways per lane so the two lanes of one approach never overlap.
pub fn spawn_position(direction: Direction, lane: u8) -> Position {
    let shift = if lane == 0 { -LANE_OFFSET } else { LANE_OFFSET };
    match direction {
        Direction::North => Position::new(WORLD_WIDTH / 2.0 + shift, WORLD_HEIGHT),
        Direction::South => Position::new(WORLD_WIDTH / 2.0 + shift, 0.0),
        Direction::East => Position::new(0.0, WORLD_HEIGHT / 2.0 + shift),
        Direction::West => Position::new(WORLD_WIDTH, WORLD_HEIGHT / 2.0 + shift),
    }
}
