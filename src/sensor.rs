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

use static_assertions::const_assert;
use std::f32::consts::TAU;

use crate::bus::smbus::{I2cInterface, Smbus};
use crate::constants::I2C_MAX_FRAME_SIZE;

// First of the two angle registers: 8 high bits, then 6 low bits.
const ANGLE_REGISTER: u8 = 0xFE;

const ANGLE_REQUEST_SIZE: usize = 1;
const ANGLE_RESPONSE_SIZE: usize = 2;
const COUNTS_PER_TURN: u32 = 1 << 14;

// Both phases of the transaction must fit a single frame of the
// request/response bus.
const_assert!(ANGLE_REQUEST_SIZE <= I2C_MAX_FRAME_SIZE);
const_assert!(ANGLE_RESPONSE_SIZE <= I2C_MAX_FRAME_SIZE);

/// 14-bit absolute rotary encoder on the request/response bus.
pub struct AbsoluteEncoder<I: I2cInterface> {
    _bus: Smbus<I>,
    _address: u16,
}

impl<I: I2cInterface> AbsoluteEncoder<I> {
    /// Create a new absolute encoder.
    ///
    /// # Arguments
    /// * `interface` - Bus hardware capability.
    /// * `address` - Device address.
    ///
    /// # Returns
    /// A new absolute encoder.
    pub fn new(interface: I, address: u16) -> Self {
        Self {
            _bus: Smbus::new(interface),
            _address: address,
        }
    }

    /// Read the absolute shaft angle.
    ///
    /// # Returns
    /// The angle in radians in [0, 2 pi), if the transaction completed.
    pub fn read_angle(&mut self) -> Option<f32> {
        let response = self
            ._bus
            .transact(self._address, &[ANGLE_REGISTER], ANGLE_RESPONSE_SIZE)?;

        let counts = ((response[0] as u32) << 6) | ((response[1] & 0x3F) as u32);

        Some(counts as f32 / COUNTS_PER_TURN as f32 * TAU)
    }
}
