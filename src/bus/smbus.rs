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

use log::{error, warn};
use std::thread::sleep;
use std::time::Duration;

use crate::constants::{I2C_MAX_FRAME_SIZE, I2C_REBOOT_DELAY, I2C_TIMEOUT};

/// Capability over the request/response bus hardware. The bus logic owns
/// exactly one value of this; nothing else touches the peripheral.
pub trait I2cInterface {
    /// Initialize the peripheral.
    ///
    /// # Returns
    /// Ok if the peripheral initialized. Otherwise, an error message.
    fn init(&mut self) -> Result<(), &'static str>;

    /// De-initialize the peripheral.
    fn deinit(&mut self);

    /// Write the bytes to the address.
    ///
    /// # Arguments
    /// * `address` - Device address.
    /// * `data` - Bytes to write.
    /// * `timeout` - Timeout in milliseconds.
    ///
    /// # Returns
    /// Ok if the write completed within the timeout. Otherwise, an error
    /// message.
    fn write(&mut self, address: u16, data: &[u8], timeout: u32) -> Result<(), &'static str>;

    /// Read the bytes from the address.
    ///
    /// # Arguments
    /// * `address` - Device address.
    /// * `buffer` - Buffer to fill.
    /// * `timeout` - Timeout in milliseconds.
    ///
    /// # Returns
    /// Ok if the read completed within the timeout. Otherwise, an error
    /// message.
    fn read(&mut self, address: u16, buffer: &mut [u8], timeout: u32) -> Result<(), &'static str>;
}

/// Request/response bus. A transaction blocks the control cycle for up to one
/// timeout per phase plus the reboot delay, which the cycle budget accounts
/// for.
pub struct Smbus<I: I2cInterface> {
    _interface: I,
}

impl<I: I2cInterface> Smbus<I> {
    /// Create a new request/response bus.
    ///
    /// # Arguments
    /// * `interface` - Bus hardware capability.
    ///
    /// # Returns
    /// A new request/response bus.
    pub fn new(interface: I) -> Self {
        Self {
            _interface: interface,
        }
    }

    /// Write a request to the device and read back its response.
    ///
    /// # Notes
    /// A write failure is treated as transient and returns nothing. A read
    /// failure reboots the bus before returning nothing, which improves the
    /// odds of the next transaction; the failed one is not retried here. The
    /// caller retries on a later control cycle.
    ///
    /// # Arguments
    /// * `address` - Device address.
    /// * `send` - Request bytes. Must fit the transport's frame size, which
    /// is a static property of the message catalogue.
    /// * `receive_size` - Number of the response bytes. Same bound as `send`.
    ///
    /// # Returns
    /// The response bytes, if the transaction completed.
    pub fn transact(&mut self, address: u16, send: &[u8], receive_size: usize) -> Option<Vec<u8>> {
        debug_assert!(send.len() <= I2C_MAX_FRAME_SIZE);
        debug_assert!(receive_size <= I2C_MAX_FRAME_SIZE);

        if self._interface.write(address, send, I2C_TIMEOUT).is_err() {
            return None;
        }

        let mut buffer = vec![0; receive_size];
        match self._interface.read(address, &mut buffer, I2C_TIMEOUT) {
            Ok(()) => Some(buffer),
            Err(message) => {
                warn!("Read failed on the request/response bus: {message}. Rebooting the bus.");

                self.reboot();

                None
            }
        }
    }

    /// Reboot the bus: de-initialize, wait a fixed delay, re-initialize. This
    /// blocks the caller.
    fn reboot(&mut self) {
        self._interface.deinit();

        sleep(Duration::from_millis(I2C_REBOOT_DELAY));

        if let Err(message) = self._interface.init() {
            error!("Failed to re-initialize the request/response bus: {message}.");
        }
    }
}
