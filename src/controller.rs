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

use crate::constants::NUM_LIMIT_SWITCH;
use crate::control::control_mode::{required_mode, ControlMode};
use crate::control::pidf::PidfGains;
use crate::enums::{ErrorCode, ModeKind};
use crate::limit_switch::LimitSwitch;
use crate::messaging::messages::{
    CalibErrorInfo, ConfigCommand, ControllerDataState, InboundMessage, LimitStateInfo,
};

/// Capability to read the feedback sensor. The read never fails observably;
/// sensor-level faults are handled underneath this seam.
pub trait InputReader {
    /// Read the current position in radians.
    ///
    /// # Returns
    /// Position.
    fn read_position(&mut self) -> f32;

    /// Read the current velocity in radians per second.
    ///
    /// # Returns
    /// Velocity.
    fn read_velocity(&mut self) -> f32;

    /// Snap the tracked position estimate to a known reference.
    ///
    /// # Arguments
    /// * `position` - Reference position in radians.
    fn adjust(&mut self, position: f32);
}

/// Capability to drive the actuator output. The write never fails observably.
pub trait OutputWriter {
    /// Write the output fraction in [-1.0, 1.0].
    ///
    /// # Arguments
    /// * `output` - Output fraction.
    fn write_output(&mut self, output: f32);
}

/// Control-mode state machine. Routes the decoded commands to the control
/// laws, owns the per-mode law state, and drives the output through the
/// injected writer while reading the injected reader.
pub struct Controller<R: InputReader, W: OutputWriter> {
    pub reader: R,
    pub writer: W,
    _mode: ControlMode,
    _limit_switches: [LimitSwitch; NUM_LIMIT_SWITCH],
    _position_gains: PidfGains,
    _velocity_gains: PidfGains,
    // Time of a single control cycle in seconds.
    _cycle_time: f32,
    // Bound of the output fraction.
    _max_output: f32,
    _is_configured: bool,
    _is_calibrated: bool,
    _error: ErrorCode,
}

impl<R: InputReader, W: OutputWriter> Controller<R, W> {
    /// Create a new controller in the none mode.
    ///
    /// # Arguments
    /// * `reader` - Feedback sensor capability.
    /// * `writer` - Actuator output capability.
    /// * `position_gains` - Gains of the position law.
    /// * `velocity_gains` - Gains of the velocity law.
    /// * `cycle_time` - Time of a single control cycle in seconds.
    /// * `max_output` - Default bound of the output fraction before a
    /// configuration command is applied.
    ///
    /// # Returns
    /// A new controller.
    pub fn new(
        reader: R,
        writer: W,
        position_gains: PidfGains,
        velocity_gains: PidfGains,
        cycle_time: f32,
        max_output: f32,
    ) -> Self {
        Self {
            reader,
            writer,
            _mode: ControlMode::None,
            _limit_switches: [LimitSwitch::new(); NUM_LIMIT_SWITCH],
            _position_gains: position_gains,
            _velocity_gains: velocity_gains,
            _cycle_time: cycle_time,
            _max_output: max_output.clamp(0.0, 1.0),
            _is_configured: false,
            _is_calibrated: false,
            _error: ErrorCode::NoError,
        }
    }

    /// Get the tag of the active mode.
    ///
    /// # Returns
    /// Mode kind.
    pub fn mode_kind(&self) -> ModeKind {
        self._mode.kind()
    }

    /// Apply a decoded command. If the command requires a mode with a
    /// different tag than the active one, the mode is replaced with a freshly
    /// constructed instance first; no integrator or filter history survives
    /// the switch.
    ///
    /// # Arguments
    /// * `message` - Command to apply.
    pub fn apply(&mut self, message: &InboundMessage) {
        if let Some(required) = required_mode(message.kind()) {
            if self._mode.kind() != required {
                info!(
                    "Switching the control mode: {} -> {}.",
                    self._mode.kind().as_ref(),
                    required.as_ref()
                );

                self._mode = ControlMode::for_kind(
                    required,
                    self._position_gains,
                    self._velocity_gains,
                    self._cycle_time,
                );
            }
        }

        match message {
            // Disengage without tearing down the hardware.
            InboundMessage::Idle => (),
            InboundMessage::Throttle(command) => {
                let output = command.throttle.clamp(-1.0, 1.0);

                self.write_gated(output);
            }
            InboundMessage::Velocity(command) => {
                let current = self.reader.read_velocity();
                if let ControlMode::Velocity(pidf) = &mut self._mode {
                    let output = pidf.calculate(current, command.velocity);

                    self.write_gated(output);
                }
            }
            InboundMessage::Position(command) => {
                let current = self.reader.read_position();
                if let ControlMode::Position(pidf) = &mut self._mode {
                    let output = pidf.calculate(current, command.position);

                    self.write_gated(output);
                }
            }
            InboundMessage::Adjust(command) => {
                self.reader.adjust(command.position);
                self._is_calibrated = true;
            }
            InboundMessage::Config(command) => {
                self.configure(command);
            }
            InboundMessage::EnableLimitSwitches(command) => {
                self._limit_switches
                    .iter_mut()
                    .filter(|limit_switch| limit_switch.is_valid())
                    .for_each(|limit_switch| {
                        if command.enable {
                            limit_switch.enable();
                        } else {
                            limit_switch.disable();
                        }
                    });
            }
        }
    }

    /// Apply a configuration command.
    ///
    /// # Arguments
    /// * `command` - Configuration to apply.
    fn configure(&mut self, command: &ConfigCommand) {
        self._error = if (0.0..=1.0).contains(&command.max_pwm) {
            ErrorCode::NoError
        } else {
            ErrorCode::ConfigInvalid
        };
        self._max_output = command.max_pwm.clamp(0.0, 1.0);

        for idx in 0..NUM_LIMIT_SWITCH {
            if command.limit_switch_info_0.present[idx] {
                self._limit_switches[idx].configure(
                    command.limit_switch_info_0.enable[idx]
                        || command.limit_switch_info_2.default_enabled[idx],
                    command.limit_switch_info_1.active_high[idx],
                    command.limit_switch_info_2.use_for_readjustment[idx],
                    command.limit_switch_info_1.limits_forward[idx],
                    command.limit_readj_pos[idx],
                );
            }
        }

        self._is_configured = true;

        info!("Applied a new configuration.");
    }

    /// Refresh the limit switches from fresh pin reads. Call once per control
    /// cycle before any query. A switch that supplies a readjustment signal
    /// snaps the tracked position estimate to its known reference.
    ///
    /// # Arguments
    /// * `raw_pin_levels` - Raw levels of the per-switch pins (A, B, C, D).
    pub fn refresh_limit_switches(&mut self, raw_pin_levels: [bool; NUM_LIMIT_SWITCH]) {
        self._limit_switches
            .iter_mut()
            .zip(raw_pin_levels.iter())
            .for_each(|(limit_switch, raw_pin_level)| {
                limit_switch.refresh(*raw_pin_level);
            });

        for idx in 0..NUM_LIMIT_SWITCH {
            if let Some(position) = self._limit_switches[idx].readjustment_position() {
                self.reader.adjust(position);
                self._is_calibrated = true;
            }
        }
    }

    /// Does any switch stop the forward travel right now?
    ///
    /// # Returns
    /// True if a forward limit is hit. Otherwise, false.
    pub fn is_forward_limited(&self) -> bool {
        self._limit_switches
            .iter()
            .any(|limit_switch| limit_switch.is_forward_limit())
    }

    /// Does any switch stop the backward travel right now?
    ///
    /// # Returns
    /// True if a backward limit is hit. Otherwise, false.
    pub fn is_backward_limited(&self) -> bool {
        self._limit_switches
            .iter()
            .any(|limit_switch| limit_switch.is_backward_limit())
    }

    /// Clamp the output to the configured bound, zero it against a hit limit,
    /// and write it.
    ///
    /// # Arguments
    /// * `output` - Output fraction.
    fn write_gated(&mut self, output: f32) {
        let mut output = output.clamp(-self._max_output, self._max_output);

        if output > 0.0 && self.is_forward_limited() {
            output = 0.0;
        }
        if output < 0.0 && self.is_backward_limited() {
            output = 0.0;
        }

        self.writer.write_output(output);
    }

    /// Get the telemetry snapshot.
    ///
    /// # Returns
    /// Controller data state.
    pub fn data_state(&mut self) -> ControllerDataState {
        let mut hit = [false; NUM_LIMIT_SWITCH];
        for idx in 0..NUM_LIMIT_SWITCH {
            hit[idx] = self._limit_switches[idx].pressed();
        }

        ControllerDataState {
            position: self.reader.read_position(),
            velocity: self.reader.read_velocity(),
            config_calib_error_info: CalibErrorInfo {
                configured: self._is_configured,
                calibrated: self._is_calibrated,
                error: self._error,
            },
            limit_switches: LimitStateInfo { hit },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::control::pidf::Pidf;
    use crate::messaging::messages::{
        AdjustCommand, EnableLimitSwitchesCommand, LimitSwitchInfo0, LimitSwitchInfo1,
        LimitSwitchInfo2, PositionCommand, ThrottleCommand, VelocityCommand,
    };

    const POSITION_GAINS: PidfGains = PidfGains {
        kp: 0.4,
        ki: 0.1,
        kd: 0.0,
        kf: 0.0,
    };
    const VELOCITY_GAINS: PidfGains = PidfGains {
        kp: 0.2,
        ki: 0.05,
        kd: 0.0,
        kf: 0.1,
    };
    const CYCLE_TIME: f32 = 0.01;

    #[derive(Default)]
    struct TestReader {
        position: f32,
        velocity: f32,
        adjustments: Vec<f32>,
    }

    impl InputReader for TestReader {
        fn read_position(&mut self) -> f32 {
            self.position
        }

        fn read_velocity(&mut self) -> f32 {
            self.velocity
        }

        fn adjust(&mut self, position: f32) {
            self.position = position;
            self.adjustments.push(position);
        }
    }

    #[derive(Default)]
    struct TestWriter {
        outputs: Vec<f32>,
    }

    impl OutputWriter for TestWriter {
        fn write_output(&mut self, output: f32) {
            self.outputs.push(output);
        }
    }

    fn create_controller() -> Controller<TestReader, TestWriter> {
        Controller::new(
            TestReader::default(),
            TestWriter::default(),
            POSITION_GAINS,
            VELOCITY_GAINS,
            CYCLE_TIME,
            1.0,
        )
    }

    fn create_limit_switch_config(limits_forward: bool) -> ConfigCommand {
        ConfigCommand {
            limit_switch_info_0: LimitSwitchInfo0 {
                present: [true, false, false, false],
                enable: [true, false, false, false],
            },
            limit_switch_info_1: LimitSwitchInfo1 {
                active_high: [true, false, false, false],
                limits_forward: [limits_forward, false, false, false],
            },
            limit_switch_info_2: LimitSwitchInfo2 {
                use_for_readjustment: [true, false, false, false],
                default_enabled: [true, false, false, false],
            },
            limit_readj_pos: [2.5, 0.0, 0.0, 0.0],
            max_pwm: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_throttle() {
        let mut controller = create_controller();

        controller.apply(&InboundMessage::Throttle(ThrottleCommand {
            throttle: 0.5,
        }));

        // Open loop: the fraction goes straight to the output and the mode
        // stays none.
        assert_eq!(controller.writer.outputs, vec![0.5]);
        assert_eq!(controller.mode_kind(), ModeKind::None);

        // Out-of-range setpoints clamp instead of failing.
        controller.apply(&InboundMessage::Throttle(ThrottleCommand {
            throttle: -1.5,
        }));

        assert_eq!(controller.writer.outputs[1], -1.0);
    }

    #[test]
    fn test_apply_idle() {
        let mut controller = create_controller();

        controller.apply(&InboundMessage::Idle);

        // Declared no-op.
        assert!(controller.writer.outputs.is_empty());
        assert_eq!(controller.mode_kind(), ModeKind::None);
    }

    #[test]
    fn test_apply_position() {
        let mut controller = create_controller();

        controller.apply(&InboundMessage::Position(PositionCommand {
            position: 1.0,
        }));

        assert_eq!(controller.mode_kind(), ModeKind::Position);

        let mut pidf = Pidf::new(POSITION_GAINS, CYCLE_TIME);
        assert_relative_eq!(
            controller.writer.outputs[0],
            pidf.calculate(0.0, 1.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_apply_velocity() {
        let mut controller = create_controller();
        controller.reader.velocity = 0.5;

        controller.apply(&InboundMessage::Velocity(VelocityCommand {
            velocity: 2.0,
        }));

        assert_eq!(controller.mode_kind(), ModeKind::Velocity);

        let mut pidf = Pidf::new(VELOCITY_GAINS, CYCLE_TIME);
        assert_relative_eq!(
            controller.writer.outputs[0],
            pidf.calculate(0.5, 2.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_mode_state_preserved_within_mode() {
        let mut controller = create_controller();
        let command = InboundMessage::Position(PositionCommand { position: 1.0 });

        controller.apply(&command);
        controller.apply(&command);

        // The integral accumulates across consecutive commands of the same
        // mode.
        let mut pidf = Pidf::new(POSITION_GAINS, CYCLE_TIME);
        let _ = pidf.calculate(0.0, 1.0);

        assert_relative_eq!(
            controller.writer.outputs[1],
            pidf.calculate(0.0, 1.0),
            epsilon = 1e-6
        );
        assert!(controller.writer.outputs[1] > controller.writer.outputs[0]);
    }

    #[test]
    fn test_mode_state_reset_on_switch() {
        let mut controller = create_controller();
        let position_command = InboundMessage::Position(PositionCommand { position: 1.0 });

        // Build up the position-mode integral, switch away, and come back.
        controller.apply(&position_command);
        controller.apply(&position_command);

        controller.apply(&InboundMessage::Velocity(VelocityCommand {
            velocity: 0.0,
        }));
        assert_eq!(controller.mode_kind(), ModeKind::Velocity);

        controller.apply(&position_command);

        // The accumulator of the earlier position mode is unobservable: the
        // output equals the one of a fresh law.
        assert_relative_eq!(
            controller.writer.outputs[3],
            controller.writer.outputs[0],
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_mode_agnostic_commands_keep_mode() {
        let mut controller = create_controller();

        controller.apply(&InboundMessage::Position(PositionCommand {
            position: 1.0,
        }));
        controller.apply(&InboundMessage::Adjust(AdjustCommand { position: 0.2 }));
        controller.apply(&InboundMessage::Config(create_limit_switch_config(true)));

        assert_eq!(controller.mode_kind(), ModeKind::Position);
    }

    #[test]
    fn test_apply_adjust() {
        let mut controller = create_controller();

        controller.apply(&InboundMessage::Adjust(AdjustCommand { position: 0.7 }));

        assert_eq!(controller.reader.adjustments, vec![0.7]);
        assert!(controller.data_state().config_calib_error_info.calibrated);
    }

    #[test]
    fn test_apply_config() {
        let mut controller = create_controller();

        controller.apply(&InboundMessage::Config(create_limit_switch_config(true)));

        let state = controller.data_state();
        assert!(state.config_calib_error_info.configured);
        assert_eq!(state.config_calib_error_info.error, ErrorCode::NoError);

        // An out-of-range output bound is clamped and flagged.
        let mut command = create_limit_switch_config(true);
        command.max_pwm = 1.5;
        controller.apply(&InboundMessage::Config(command));

        assert_eq!(
            controller.data_state().config_calib_error_info.error,
            ErrorCode::ConfigInvalid
        );

        controller.apply(&InboundMessage::Throttle(ThrottleCommand {
            throttle: 1.0,
        }));
        assert_eq!(*controller.writer.outputs.last().unwrap(), 1.0);
    }

    #[test]
    fn test_forward_limit_gates_output() {
        let mut controller = create_controller();
        controller.apply(&InboundMessage::Config(create_limit_switch_config(true)));

        controller.refresh_limit_switches([true, false, false, false]);

        assert!(controller.is_forward_limited());
        assert!(!controller.is_backward_limited());

        // Positive output is blocked, negative still passes.
        controller.apply(&InboundMessage::Throttle(ThrottleCommand {
            throttle: 0.5,
        }));
        controller.apply(&InboundMessage::Throttle(ThrottleCommand {
            throttle: -0.5,
        }));

        assert_eq!(controller.writer.outputs, vec![0.0, -0.5]);
    }

    #[test]
    fn test_backward_limit_gates_output() {
        let mut controller = create_controller();
        controller.apply(&InboundMessage::Config(create_limit_switch_config(false)));

        controller.refresh_limit_switches([true, false, false, false]);

        controller.apply(&InboundMessage::Throttle(ThrottleCommand {
            throttle: -0.5,
        }));

        assert_eq!(controller.writer.outputs, vec![0.0]);
    }

    #[test]
    fn test_refresh_limit_switches_readjusts() {
        let mut controller = create_controller();
        controller.apply(&InboundMessage::Config(create_limit_switch_config(true)));

        controller.refresh_limit_switches([true, false, false, false]);

        // The tracked estimate snapped to the known trigger position.
        assert_eq!(controller.reader.adjustments, vec![2.5]);
        assert_eq!(controller.reader.position, 2.5);
    }

    #[test]
    fn test_enable_limit_switches() {
        let mut controller = create_controller();
        controller.apply(&InboundMessage::Config(create_limit_switch_config(true)));

        controller.refresh_limit_switches([true, false, false, false]);
        assert!(controller.is_forward_limited());

        // Disabling clears the pressed state immediately.
        controller.apply(&InboundMessage::EnableLimitSwitches(
            EnableLimitSwitchesCommand { enable: false },
        ));

        assert!(!controller.is_forward_limited());
        assert!(!controller.data_state().limit_switches.hit[0]);

        controller.apply(&InboundMessage::EnableLimitSwitches(
            EnableLimitSwitchesCommand { enable: true },
        ));
        controller.refresh_limit_switches([true, false, false, false]);

        assert!(controller.is_forward_limited());
    }

    #[test]
    fn test_data_state() {
        let mut controller = create_controller();
        controller.reader.position = 0.25;
        controller.reader.velocity = -1.0;

        let state = controller.data_state();

        assert_eq!(state.position, 0.25);
        assert_eq!(state.velocity, -1.0);
        assert!(!state.config_calib_error_info.configured);
        assert_eq!(state.limit_switches.hit, [false; NUM_LIMIT_SWITCH]);
    }
}
