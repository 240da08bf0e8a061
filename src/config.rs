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

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::control::pidf::PidfGains;
use crate::utility::{get_parameter, get_parameter_array};

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct NodeConfig {
    // Configuration filename.
    pub filename: String,
    // Control frequency in Hz.
    pub control_frequency: f64,
    // Source address of this node on the broadcast bus.
    pub can_source: u8,
    // Destination address of the supervisory host on the broadcast bus.
    pub can_destination: u8,
    // Absolute encoder on the request/response bus.
    pub abs_encoder_present: bool,
    pub abs_encoder_address: u16,
    // Control-law gains.
    pub position_gains: PidfGains,
    pub velocity_gains: PidfGains,
    // Default bound of the output fraction before a configuration command is
    // applied.
    pub max_output: f32,
}

impl NodeConfig {
    /// Create a new node configuration.
    ///
    /// # Notes
    /// A missing or unparsable parameter is an unrecoverable initialization
    /// fault and panics here. Steady-state operation never reads the file
    /// again.
    ///
    /// # Arguments
    /// * `filepath` - The path to the control parameters file.
    ///
    /// # Returns
    /// A new node configuration.
    pub fn new(filepath: &Path) -> Self {
        Self {
            filename: String::from(filepath.to_str().expect(&format!(
                "Should be able to convert {:?} to a string",
                filepath
            ))),

            control_frequency: get_parameter(filepath, "control_frequency"),

            can_source: get_parameter(filepath, "can_source"),
            can_destination: get_parameter(filepath, "can_destination"),

            abs_encoder_present: get_parameter(filepath, "abs_encoder_present"),
            abs_encoder_address: get_parameter(filepath, "abs_encoder_address"),

            position_gains: Self::read_gains(filepath, "position_gains"),
            velocity_gains: Self::read_gains(filepath, "velocity_gains"),

            max_output: get_parameter(filepath, "max_output"),
        }
    }

    /// Read the control-law gains from the configuration file.
    ///
    /// # Arguments
    /// * `filepath` - The path to the control parameters file.
    /// * `key` - Key of the gains.
    ///
    /// # Returns
    /// Gains in the order of [kp, ki, kd, kf].
    fn read_gains(filepath: &Path, key: &str) -> PidfGains {
        let values: Vec<f32> = get_parameter_array(filepath, key);

        PidfGains::from_slice(&values)
    }

    /// Get the cycle time.
    ///
    /// # Returns
    /// Time of a single control cycle in seconds.
    pub fn cycle_time(&self) -> f64 {
        1.0 / self.control_frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_node_config() -> NodeConfig {
        NodeConfig::new(Path::new("config/parameters_control.yaml"))
    }

    #[test]
    fn test_new() {
        let config = create_node_config();

        assert_eq!(config.control_frequency, 100.0);
        assert_eq!(config.can_source, 5);
        assert_eq!(config.can_destination, 1);
        assert_eq!(config.abs_encoder_address, 64);
        assert!(config.abs_encoder_present);

        assert_eq!(config.position_gains.kp, 4.0);
        assert_eq!(config.velocity_gains.ki, 0.05);

        assert_eq!(config.max_output, 1.0);
    }

    #[test]
    fn test_cycle_time() {
        let config = create_node_config();

        assert_eq!(config.cycle_time(), 0.01);
    }
}
