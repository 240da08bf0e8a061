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

//! # Brushed DC Motor Controller
//!
//! This library is the closed-loop control firmware of a single brushed DC
//! motor node on the rover's broadcast bus.
pub mod application;
pub mod bus;
pub mod config;
pub mod constants;
pub mod control;
pub mod controller;
pub mod enums;
pub mod limit_switch;
pub mod messaging;
pub mod mock;
pub mod model;
pub mod sensor;
pub mod utility;
