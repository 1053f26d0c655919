//! Traffic-light state machine
//!
//! Two perpendicular axes cycle through a fixed four-phase sequence:
//! NS-green, NS-yellow, EW-green, EW-yellow. Exactly one axis is non-red
//! at any instant. Emergency override pre-empts the cycle and freezes the
//! phase timer until cleared.

use super::types::{Axis, Direction, LightColor};

/// Fixed yellow interval in seconds between a green phase and the
/// opposing green.
pub const YELLOW_TIME: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct LightController {
    north_south: LightColor,
    east_west: LightColor,
    phase_timer: f64,
    phase_duration: f64,
    emergency_mode: bool,
    emergency_direction: Option<Direction>,
}

impl LightController {
    /// Fresh controller: north-south green, east-west red.
    pub fn new(green_time: f64) -> Self {
        Self {
            north_south: LightColor::Green,
            east_west: LightColor::Red,
            phase_timer: 0.0,
            phase_duration: green_time,
            emergency_mode: false,
            emergency_direction: None,
        }
    }

    /// Advance the phase timer and perform at most one transition.
    ///
    /// No-op while the emergency override holds the lights. The green
    /// interval for the next green phase is read from the active
    /// configuration each tick.
    pub fn advance(&mut self, dt: f64, green_time: f64) {
        if self.emergency_mode {
            return;
        }

        self.phase_timer += dt;
        if self.phase_timer >= self.phase_duration {
            self.phase_timer = 0.0;
            self.transition(green_time);
        }
    }

    fn transition(&mut self, green_time: f64) {
        if self.north_south == LightColor::Green {
            self.north_south = LightColor::Yellow;
            self.phase_duration = YELLOW_TIME;
        } else if self.north_south == LightColor::Yellow {
            self.north_south = LightColor::Red;
            self.east_west = LightColor::Green;
            self.phase_duration = green_time;
        } else if self.east_west == LightColor::Green {
            self.east_west = LightColor::Yellow;
            self.phase_duration = YELLOW_TIME;
        } else if self.east_west == LightColor::Yellow {
            self.east_west = LightColor::Red;
            self.north_south = LightColor::Green;
            self.phase_duration = green_time;
        }
    }

    /// True iff the axis controlling `direction` is green.
    pub fn can_go(&self, direction: Direction) -> bool {
        self.axis_color(direction.axis()) == LightColor::Green
    }

    pub fn axis_color(&self, axis: Axis) -> LightColor {
        match axis {
            Axis::NorthSouth => self.north_south,
            Axis::EastWest => self.east_west,
        }
    }

    /// Force the axis serving `direction` green and the other red,
    /// pre-empting any in-progress yellow, and freeze the timer.
    pub fn activate_emergency(&mut self, direction: Direction) {
        self.emergency_mode = true;
        self.emergency_direction = Some(direction);
        match direction.axis() {
            Axis::NorthSouth => {
                self.north_south = LightColor::Green;
                self.east_west = LightColor::Red;
            }
            Axis::EastWest => {
                self.east_west = LightColor::Green;
                self.north_south = LightColor::Red;
            }
        }
    }

    /// Clear the override and restart the current phase's timer; the
    /// phase duration from before the override is retained.
    pub fn deactivate_emergency(&mut self) {
        self.emergency_mode = false;
        self.emergency_direction = None;
        self.phase_timer = 0.0;
    }

    /// Lengthen the current phase. Ignored while the override holds the
    /// lights, since the frozen timer would make the extension meaningless.
    pub fn extend_current_phase(&mut self, seconds: f64) {
        if self.emergency_mode {
            return;
        }
        self.phase_duration += seconds;
    }

    pub fn emergency_mode(&self) -> bool {
        self.emergency_mode
    }

    pub fn emergency_direction(&self) -> Option<Direction> {
        self.emergency_direction
    }

    pub fn time_remaining(&self) -> f64 {
        (self.phase_duration - self.phase_timer).max(0.0)
    }

    pub fn phase_duration(&self) -> f64 {
        self.phase_duration
    }
}
