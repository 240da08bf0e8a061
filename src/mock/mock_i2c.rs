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

use crate::bus::smbus::I2cInterface;

/// Mock request/response device that answers every read with a fixed
/// response.
pub struct MockI2cDevice {
    // Fail the next write only, then recover.
    pub fail_next_write: bool,
    // Fail every read until the peripheral is re-initialized.
    pub fail_reads_until_reinit: bool,
    // Requests written to the device.
    pub written: Vec<Vec<u8>>,
    pub init_count: usize,
    pub deinit_count: usize,
    _response: Vec<u8>,
}

impl MockI2cDevice {
    /// Create a new mock request/response device.
    ///
    /// # Arguments
    /// * `response` - Fixed response to every read.
    ///
    /// # Returns
    /// A new mock device.
    pub fn new(response: &[u8]) -> Self {
        Self {
            fail_next_write: false,
            fail_reads_until_reinit: false,
            written: Vec::new(),
            init_count: 0,
            deinit_count: 0,
            _response: response.to_vec(),
        }
    }
}

impl I2cInterface for MockI2cDevice {
    fn init(&mut self) -> Result<(), &'static str> {
        self.init_count += 1;
        self.fail_reads_until_reinit = false;

        Ok(())
    }

    fn deinit(&mut self) {
        self.deinit_count += 1;
    }

    fn write(&mut self, _address: u16, data: &[u8], _timeout: u32) -> Result<(), &'static str> {
        if self.fail_next_write {
            self.fail_next_write = false;

            return Err("Mock write failure.");
        }

        self.written.push(data.to_vec());

        Ok(())
    }

    fn read(&mut self, _address: u16, buffer: &mut [u8], _timeout: u32) -> Result<(), &'static str> {
        if self.fail_reads_until_reinit {
            return Err("Mock read failure.");
        }

        for (target, source) in buffer.iter_mut().zip(self._response.iter()) {
            *target = *source;
        }

        Ok(())
    }
}
