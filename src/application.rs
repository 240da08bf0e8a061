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

use log::info;
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    flag::register,
};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::thread::sleep;
use std::time::Duration;

use crate::config::NodeConfig;
use crate::model::Model;

/// Run the application.
///
/// # Arguments
/// * `is_simulation_mode` - Is the simulation mode or not.
pub fn run(is_simulation_mode: bool) {
    if !is_simulation_mode {
        panic!("Not implemented yet.");
    }

    info!("Run the brushed DC motor controller in simulation mode.");

    let config = NodeConfig::new(Path::new("config/parameters_control.yaml"));
    let cycle = Duration::from_secs_f64(config.cycle_time());

    // Create the model
    let mut model = Model::new(&config);

    // Register the signals that stop the application
    for signal in [SIGTERM, SIGINT].iter() {
        let _ = register(*signal, model.stop.clone());
    }

    // Run the main loop
    while !model.stop.load(Ordering::Relaxed) {
        model.step();

        sleep(cycle);
    }

    info!("Brushed DC motor controller stopped.");
}
