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
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::warn;

use crate::bus::can_bus::FdCanBus;
use crate::config::NodeConfig;
use crate::constants::CAN_MAILBOX_CAPACITY;
use crate::controller::{Controller, InputReader};
use crate::messaging::messages::{InboundMessage, OutboundMessage};
use crate::mock::mock_can::MockCanInterface;
use crate::mock::mock_i2c::MockI2cDevice;
use crate::mock::mock_plant::{MockPlant, PlantReader, PlantWriter};
use crate::sensor::AbsoluteEncoder;

// Fixed response of the simulated absolute encoder: the zero angle.
const MOCK_ENCODER_RESPONSE: [u8; 2] = [0x00, 0x00];

/// Top-level node model: the simulated plant, the control-mode state
/// machine, the broadcast bus, and the optional absolute encoder, stepped
/// together once per control cycle.
pub struct Model {
    pub plant: Rc<RefCell<MockPlant>>,
    pub controller: Controller<PlantReader, PlantWriter>,
    pub bus: FdCanBus<MockCanInterface>,
    pub encoder: Option<AbsoluteEncoder<MockI2cDevice>>,
    // Requested to stop or not.
    pub stop: Arc<AtomicBool>,
    _cycle_time: f32,
}

impl Model {
    /// Create a new model.
    ///
    /// # Notes
    /// A broadcast-bus start failure is an unrecoverable initialization
    /// fault and panics here on purpose.
    ///
    /// # Arguments
    /// * `config` - Node configuration.
    ///
    /// # Returns
    /// A new model.
    pub fn new(config: &NodeConfig) -> Self {
        let plant = Rc::new(RefCell::new(MockPlant::new()));

        let mut controller = Controller::new(
            PlantReader {
                plant: plant.clone(),
            },
            PlantWriter {
                plant: plant.clone(),
            },
            config.position_gains,
            config.velocity_gains,
            config.cycle_time() as f32,
            config.max_output,
        );

        let bus = FdCanBus::new(
            config.can_source,
            config.can_destination,
            MockCanInterface::new(CAN_MAILBOX_CAPACITY),
        )
        .expect("Should start the broadcast bus.");

        let encoder = if config.abs_encoder_present {
            let mut encoder = AbsoluteEncoder::new(
                MockI2cDevice::new(&MOCK_ENCODER_RESPONSE),
                config.abs_encoder_address,
            );

            // Seed the tracked position estimate from the absolute angle so
            // the node powers up knowing where the shaft is.
            if let Some(angle) = encoder.read_angle() {
                controller.reader.adjust(angle);
            }

            Some(encoder)
        } else {
            None
        };

        Self {
            plant,
            controller,
            bus,
            encoder,
            stop: Arc::new(AtomicBool::new(false)),
            _cycle_time: config.cycle_time() as f32,
        }
    }

    /// Run a single control cycle: step the simulated physics, refresh the
    /// limit switches, apply every received command, and broadcast the
    /// telemetry once.
    pub fn step(&mut self) {
        self.plant.borrow_mut().step(self._cycle_time);

        let raw_pin_levels = self.plant.borrow().limit_pin_levels();
        self.controller.refresh_limit_switches(raw_pin_levels);

        while let Some((_, payload)) = self.bus.receive() {
            match InboundMessage::from_frame(&payload) {
                Ok(message) => self.controller.apply(&message),
                Err(error) => {
                    warn!("Ignoring an undecodable frame: {error}.");
                }
            }
        }

        let state = self.controller.data_state();
        self.bus
            .broadcast(&OutboundMessage::ControllerData(state).encode());
    }
}
