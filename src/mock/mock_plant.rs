// This file is part of run_bdc_controller.
//
// Developed for the embedded software of the multi-actuator rover platform.
// See the COPYRIGHT file at the top-level directory of this distribution
// for details of code ownership.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::cell::RefCell;
use std::rc::Rc;

use crate::constants::NUM_LIMIT_SWITCH;
use crate::controller::{InputReader, OutputWriter};
use crate::mock::mock_constants::{
    PLANT_BACKWARD_LIMIT_POSITION, PLANT_FORWARD_LIMIT_POSITION, PLANT_MAX_SPEED,
    PLANT_TIME_CONSTANT,
};

/// Mock plant model to simulate a single driven shaft: a first-order
/// velocity response to the output fraction, hard stops at the travel ends,
/// and active-high travel-end switches on the first two pins.
pub struct MockPlant {
    // True position of the shaft in radians.
    pub position: f32,
    // Velocity of the shaft in radians per second.
    pub velocity: f32,
    // Output fraction most recently commanded in [-1.0, 1.0].
    pub commanded_output: f32,
    // The tracked estimate is the true position plus this offset. A
    // readjustment changes the offset, never the true position.
    _position_offset: f32,
}

impl MockPlant {
    /// Create a new mock plant at rest at the zero position.
    ///
    /// # Returns
    /// A new mock plant.
    pub fn new() -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            commanded_output: 0.0,
            _position_offset: 0.0,
        }
    }

    /// Advance the simulated physics by one control cycle.
    ///
    /// # Arguments
    /// * `cycle_time` - Time of a single control cycle in seconds.
    pub fn step(&mut self, cycle_time: f32) {
        let target_velocity = self.commanded_output * PLANT_MAX_SPEED;
        let alpha = cycle_time / (PLANT_TIME_CONSTANT + cycle_time);

        self.velocity += alpha * (target_velocity - self.velocity);
        self.position += self.velocity * cycle_time;

        // Hard stops at the travel ends.
        if self.position >= PLANT_FORWARD_LIMIT_POSITION {
            self.position = PLANT_FORWARD_LIMIT_POSITION;
            self.velocity = self.velocity.min(0.0);
        } else if self.position <= PLANT_BACKWARD_LIMIT_POSITION {
            self.position = PLANT_BACKWARD_LIMIT_POSITION;
            self.velocity = self.velocity.max(0.0);
        }
    }

    /// Get the tracked position estimate in radians.
    ///
    /// # Returns
    /// Position estimate.
    pub fn tracked_position(&self) -> f32 {
        self.position + self._position_offset
    }

    /// Snap the tracked position estimate to a known reference.
    ///
    /// # Arguments
    /// * `position` - Reference position in radians.
    pub fn adjust(&mut self, position: f32) {
        self._position_offset = position - self.position;
    }

    /// Get the raw levels of the travel-end switch pins (A, B, C, D). The
    /// pins are active high; C and D are not populated.
    ///
    /// # Returns
    /// Raw pin levels.
    pub fn limit_pin_levels(&self) -> [bool; NUM_LIMIT_SWITCH] {
        [
            self.position >= PLANT_FORWARD_LIMIT_POSITION,
            self.position <= PLANT_BACKWARD_LIMIT_POSITION,
            false,
            false,
        ]
    }
}

impl Default for MockPlant {
    fn default() -> Self {
        Self::new()
    }
}

/// Feedback-sensor side of a shared mock plant.
pub struct PlantReader {
    pub plant: Rc<RefCell<MockPlant>>,
}

impl InputReader for PlantReader {
    fn read_position(&mut self) -> f32 {
        self.plant.borrow().tracked_position()
    }

    fn read_velocity(&mut self) -> f32 {
        self.plant.borrow().velocity
    }

    fn adjust(&mut self, position: f32) {
        self.plant.borrow_mut().adjust(position);
    }
}

/// Actuator side of a shared mock plant.
pub struct PlantWriter {
    pub plant: Rc<RefCell<MockPlant>>,
}

impl OutputWriter for PlantWriter {
    fn write_output(&mut self, output: f32) {
        self.plant.borrow_mut().commanded_output = output;
    }
}
