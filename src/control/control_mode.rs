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

use crate::control::pidf::{Pidf, PidfGains};
use crate::enums::{MessageKind, ModeKind};

/// Active control mode. Each closed-loop variant owns its control-law
/// instance; replacing the variant discards the accumulated law state.
pub enum ControlMode {
    None,
    Position(Pidf),
    Velocity(Pidf),
}

impl ControlMode {
    /// Get the tag of the mode.
    ///
    /// # Returns
    /// Mode kind.
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::None => ModeKind::None,
            Self::Position(_) => ModeKind::Position,
            Self::Velocity(_) => ModeKind::Velocity,
        }
    }

    /// Construct a fresh mode of the given kind with a zeroed control law.
    ///
    /// # Arguments
    /// * `kind` - Mode kind.
    /// * `position_gains` - Gains of the position law.
    /// * `velocity_gains` - Gains of the velocity law.
    /// * `cycle_time` - Time of a single control cycle in seconds.
    ///
    /// # Returns
    /// A new mode.
    pub fn for_kind(
        kind: ModeKind,
        position_gains: PidfGains,
        velocity_gains: PidfGains,
        cycle_time: f32,
    ) -> Self {
        match kind {
            ModeKind::None => Self::None,
            ModeKind::Position => Self::Position(Pidf::new(position_gains, cycle_time)),
            ModeKind::Velocity => Self::Velocity(Pidf::new(velocity_gains, cycle_time)),
        }
    }
}

/// Get the mode a command kind requires. The match is exhaustive on purpose:
/// adding a message kind without deciding its routing does not compile.
///
/// # Arguments
/// * `kind` - Message kind.
///
/// # Returns
/// The required mode kind, or None for a mode-agnostic command that leaves
/// the current mode untouched.
pub fn required_mode(kind: MessageKind) -> Option<ModeKind> {
    match kind {
        MessageKind::Idle | MessageKind::Throttle => Some(ModeKind::None),
        MessageKind::Position => Some(ModeKind::Position),
        MessageKind::Velocity => Some(ModeKind::Velocity),
        MessageKind::Adjust | MessageKind::Config | MessageKind::EnableLimitSwitches => None,
        // Outbound tag; the decode boundary never routes it here.
        MessageKind::ControllerData => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAINS: PidfGains = PidfGains {
        kp: 1.0,
        ki: 0.0,
        kd: 0.0,
        kf: 0.0,
    };

    #[test]
    fn test_kind() {
        assert_eq!(ControlMode::None.kind(), ModeKind::None);
        assert_eq!(
            ControlMode::for_kind(ModeKind::Position, GAINS, GAINS, 0.01).kind(),
            ModeKind::Position
        );
        assert_eq!(
            ControlMode::for_kind(ModeKind::Velocity, GAINS, GAINS, 0.01).kind(),
            ModeKind::Velocity
        );
    }

    #[test]
    fn test_required_mode() {
        assert_eq!(required_mode(MessageKind::Idle), Some(ModeKind::None));
        assert_eq!(required_mode(MessageKind::Throttle), Some(ModeKind::None));
        assert_eq!(
            required_mode(MessageKind::Position),
            Some(ModeKind::Position)
        );
        assert_eq!(
            required_mode(MessageKind::Velocity),
            Some(ModeKind::Velocity)
        );

        assert_eq!(required_mode(MessageKind::Adjust), None);
        assert_eq!(required_mode(MessageKind::Config), None);
        assert_eq!(required_mode(MessageKind::EnableLimitSwitches), None);
    }
}
