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

//! Message catalogue of the wire protocol.
//!
//! A frame is `[kind, payload...]` where `kind` is the `MessageKind` tag and
//! the payload length is a fixed per-variant constant. Scalars are IEEE-754
//! f32, little-endian. Bit-packed bytes are serialized with explicit mask and
//! shift operations (bit 0 is the least significant bit; the switches are
//! ordered A, B, C, D), so the format does not depend on the host
//! representation.

use static_assertions::const_assert;

use crate::constants::{CANFD_MAX_FRAME_SIZE, NUM_LIMIT_SWITCH};
use crate::enums::{
    BitEnum, CalibErrorBit, EncoderInfoBit, ErrorCode, LimitMaxPositionBit, MessageKind,
};
use crate::messaging::DecodeError;

/// Pack two groups of four flags into the low and the high nibble.
///
/// # Arguments
/// * `low` - Per-switch flags on bits 0-3.
/// * `high` - Per-switch flags on bits 4-7.
///
/// # Returns
/// Packed byte.
fn pack_nibbles(low: &[bool; NUM_LIMIT_SWITCH], high: &[bool; NUM_LIMIT_SWITCH]) -> u8 {
    let mut byte = 0;
    for idx in 0..NUM_LIMIT_SWITCH {
        byte |= (low[idx] as u8) << idx;
        byte |= (high[idx] as u8) << (idx + 4);
    }

    byte
}

/// Unpack the low and the high nibble into two groups of four flags.
///
/// # Arguments
/// * `byte` - Packed byte.
///
/// # Returns
/// Per-switch flags on bits 0-3 and on bits 4-7.
fn unpack_nibbles(byte: u8) -> ([bool; NUM_LIMIT_SWITCH], [bool; NUM_LIMIT_SWITCH]) {
    let mut low = [false; NUM_LIMIT_SWITCH];
    let mut high = [false; NUM_LIMIT_SWITCH];
    for idx in 0..NUM_LIMIT_SWITCH {
        low[idx] = byte & (1 << idx) != 0;
        high[idx] = byte & (1 << (idx + 4)) != 0;
    }

    (low, high)
}

/// Limit-switch configuration byte 0: bits 0-3 per-switch "present", bits 4-7
/// per-switch "enable".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LimitSwitchInfo0 {
    pub present: [bool; NUM_LIMIT_SWITCH],
    pub enable: [bool; NUM_LIMIT_SWITCH],
}

impl LimitSwitchInfo0 {
    pub fn to_byte(&self) -> u8 {
        pack_nibbles(&self.present, &self.enable)
    }

    pub fn from_byte(byte: u8) -> Self {
        let (present, enable) = unpack_nibbles(byte);

        Self { present, enable }
    }
}

/// Limit-switch configuration byte 1: bits 0-3 per-switch "active-high", bits
/// 4-7 per-switch "limits-forward".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LimitSwitchInfo1 {
    pub active_high: [bool; NUM_LIMIT_SWITCH],
    pub limits_forward: [bool; NUM_LIMIT_SWITCH],
}

impl LimitSwitchInfo1 {
    pub fn to_byte(&self) -> u8 {
        pack_nibbles(&self.active_high, &self.limits_forward)
    }

    pub fn from_byte(byte: u8) -> Self {
        let (active_high, limits_forward) = unpack_nibbles(byte);

        Self {
            active_high,
            limits_forward,
        }
    }
}

/// Limit-switch configuration byte 2: bits 0-3 per-switch
/// "use-for-readjustment", bits 4-7 per-switch "default-enabled".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LimitSwitchInfo2 {
    pub use_for_readjustment: [bool; NUM_LIMIT_SWITCH],
    pub default_enabled: [bool; NUM_LIMIT_SWITCH],
}

impl LimitSwitchInfo2 {
    pub fn to_byte(&self) -> u8 {
        pack_nibbles(&self.use_for_readjustment, &self.default_enabled)
    }

    pub fn from_byte(byte: u8) -> Self {
        let (use_for_readjustment, default_enabled) = unpack_nibbles(byte);

        Self {
            use_for_readjustment,
            default_enabled,
        }
    }
}

/// Encoder configuration byte. Bits 0-3 are reserved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncoderInfo {
    pub quad_present: bool,
    pub quad_forward_polarity: bool,
    pub abs_present: bool,
    pub abs_forward_polarity: bool,
}

impl EncoderInfo {
    pub fn to_byte(&self) -> u8 {
        let mut byte = 0;
        if self.quad_present {
            byte |= EncoderInfoBit::QuadPresent.bit_value();
        }
        if self.quad_forward_polarity {
            byte |= EncoderInfoBit::QuadForwardPolarity.bit_value();
        }
        if self.abs_present {
            byte |= EncoderInfoBit::AbsPresent.bit_value();
        }
        if self.abs_forward_polarity {
            byte |= EncoderInfoBit::AbsForwardPolarity.bit_value();
        }

        byte
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            quad_present: byte & EncoderInfoBit::QuadPresent.bit_value() != 0,
            quad_forward_polarity: byte & EncoderInfoBit::QuadForwardPolarity.bit_value() != 0,
            abs_present: byte & EncoderInfoBit::AbsPresent.bit_value() != 0,
            abs_forward_polarity: byte & EncoderInfoBit::AbsForwardPolarity.bit_value() != 0,
        }
    }
}

/// Travel-limit byte. Bits 0-5 are reserved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LimitMaxPositionInfo {
    pub limit_max_forward: bool,
    pub limit_max_backward: bool,
}

impl LimitMaxPositionInfo {
    pub fn to_byte(&self) -> u8 {
        let mut byte = 0;
        if self.limit_max_forward {
            byte |= LimitMaxPositionBit::MaxForward.bit_value();
        }
        if self.limit_max_backward {
            byte |= LimitMaxPositionBit::MaxBackward.bit_value();
        }

        byte
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            limit_max_forward: byte & LimitMaxPositionBit::MaxForward.bit_value() != 0,
            limit_max_backward: byte & LimitMaxPositionBit::MaxBackward.bit_value() != 0,
        }
    }
}

/// Calibration/error byte. Bits 0-1 are reserved, bits 4-7 carry the error
/// code (0 means no error).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CalibErrorInfo {
    pub configured: bool,
    pub calibrated: bool,
    pub error: ErrorCode,
}

impl CalibErrorInfo {
    pub fn to_byte(&self) -> u8 {
        let mut byte = (self.error as u8) << 4;
        if self.configured {
            byte |= CalibErrorBit::Configured.bit_value();
        }
        if self.calibrated {
            byte |= CalibErrorBit::Calibrated.bit_value();
        }

        byte
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            configured: byte & CalibErrorBit::Configured.bit_value() != 0,
            calibrated: byte & CalibErrorBit::Calibrated.bit_value() != 0,
            // An undefined code maps to no error instead of failing; the
            // codes are a telemetry annotation, not a routing input.
            error: ErrorCode::from_repr(byte >> 4).unwrap_or(ErrorCode::NoError),
        }
    }
}

/// Limit-state byte of the telemetry. Bits 0-3 are reserved, bits 4-7 are the
/// per-switch "hit" flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LimitStateInfo {
    pub hit: [bool; NUM_LIMIT_SWITCH],
}

impl LimitStateInfo {
    pub fn to_byte(&self) -> u8 {
        pack_nibbles(&[false; NUM_LIMIT_SWITCH], &self.hit)
    }

    pub fn from_byte(byte: u8) -> Self {
        let (_, hit) = unpack_nibbles(byte);

        Self { hit }
    }
}

/// Readjust the tracked position estimate to a known reference in radians.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AdjustCommand {
    pub position: f32,
}

/// Configure the node: gearing, limit switches, encoders, output bound, and
/// travel limits.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ConfigCommand {
    pub gear_ratio: f32,
    pub limit_switch_info_0: LimitSwitchInfo0,
    pub limit_switch_info_1: LimitSwitchInfo1,
    pub limit_switch_info_2: LimitSwitchInfo2,
    pub quad_abs_enc_info: EncoderInfo,
    // Per-switch readjustment positions in radians.
    pub limit_readj_pos: [f32; NUM_LIMIT_SWITCH],
    pub quad_enc_out_ratio: f32,
    pub abs_enc_out_ratio: f32,
    // Bound of the output fraction in [0.0, 1.0].
    pub max_pwm: f32,
    pub limit_max_pos: LimitMaxPositionInfo,
    // Travel limits in meters.
    pub max_forward_pos: f32,
    pub max_back_pos: f32,
}

/// Enable or disable every valid limit switch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnableLimitSwitchesCommand {
    pub enable: bool,
}

/// Drive the output open loop with a signed fraction in [-1.0, 1.0].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ThrottleCommand {
    pub throttle: f32,
}

/// Track a target velocity in radians per second.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct VelocityCommand {
    pub velocity: f32,
}

/// Track a target position in radians.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PositionCommand {
    pub position: f32,
}

/// Telemetry snapshot of the controller.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ControllerDataState {
    pub position: f32,
    pub velocity: f32,
    pub config_calib_error_info: CalibErrorInfo,
    pub limit_switches: LimitStateInfo,
}

impl AdjustCommand {
    pub const PAYLOAD_SIZE: usize = 4;
}

impl ConfigCommand {
    pub const PAYLOAD_SIZE: usize = 45;
}

impl EnableLimitSwitchesCommand {
    pub const PAYLOAD_SIZE: usize = 1;
}

impl ThrottleCommand {
    pub const PAYLOAD_SIZE: usize = 4;
}

impl VelocityCommand {
    pub const PAYLOAD_SIZE: usize = 4;
}

impl PositionCommand {
    pub const PAYLOAD_SIZE: usize = 4;
}

impl ControllerDataState {
    pub const PAYLOAD_SIZE: usize = 10;
}

// Every frame (tag byte plus payload) must fit a single broadcast frame. This
// is a property of the message catalogue, never a runtime check.
const_assert!(1 + AdjustCommand::PAYLOAD_SIZE <= CANFD_MAX_FRAME_SIZE);
const_assert!(1 + ConfigCommand::PAYLOAD_SIZE <= CANFD_MAX_FRAME_SIZE);
const_assert!(1 + EnableLimitSwitchesCommand::PAYLOAD_SIZE <= CANFD_MAX_FRAME_SIZE);
const_assert!(1 + ThrottleCommand::PAYLOAD_SIZE <= CANFD_MAX_FRAME_SIZE);
const_assert!(1 + VelocityCommand::PAYLOAD_SIZE <= CANFD_MAX_FRAME_SIZE);
const_assert!(1 + PositionCommand::PAYLOAD_SIZE <= CANFD_MAX_FRAME_SIZE);
const_assert!(1 + ControllerDataState::PAYLOAD_SIZE <= CANFD_MAX_FRAME_SIZE);

/// Read an f32 at the offset. The caller has validated the payload length.
fn get_f32(payload: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        payload[offset],
        payload[offset + 1],
        payload[offset + 2],
        payload[offset + 3],
    ])
}

/// Command from the supervisory host to this node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InboundMessage {
    Adjust(AdjustCommand),
    Config(ConfigCommand),
    EnableLimitSwitches(EnableLimitSwitchesCommand),
    Idle,
    Throttle(ThrottleCommand),
    Velocity(VelocityCommand),
    Position(PositionCommand),
}

/// Telemetry from this node to the supervisory host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutboundMessage {
    ControllerData(ControllerDataState),
}

impl InboundMessage {
    /// Get the wire tag of the message.
    ///
    /// # Returns
    /// Message kind.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Adjust(_) => MessageKind::Adjust,
            Self::Config(_) => MessageKind::Config,
            Self::EnableLimitSwitches(_) => MessageKind::EnableLimitSwitches,
            Self::Idle => MessageKind::Idle,
            Self::Throttle(_) => MessageKind::Throttle,
            Self::Velocity(_) => MessageKind::Velocity,
            Self::Position(_) => MessageKind::Position,
        }
    }

    /// Encode the message into a frame.
    ///
    /// # Returns
    /// Frame bytes: the tag byte followed by the fixed-layout payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = vec![self.kind() as u8];
        match self {
            Self::Adjust(command) => {
                frame.extend_from_slice(&command.position.to_le_bytes());
            }
            Self::Config(command) => {
                frame.extend_from_slice(&command.gear_ratio.to_le_bytes());
                frame.push(command.limit_switch_info_0.to_byte());
                frame.push(command.limit_switch_info_1.to_byte());
                frame.push(command.limit_switch_info_2.to_byte());
                frame.push(command.quad_abs_enc_info.to_byte());
                for position in command.limit_readj_pos.iter() {
                    frame.extend_from_slice(&position.to_le_bytes());
                }
                frame.extend_from_slice(&command.quad_enc_out_ratio.to_le_bytes());
                frame.extend_from_slice(&command.abs_enc_out_ratio.to_le_bytes());
                frame.extend_from_slice(&command.max_pwm.to_le_bytes());
                frame.push(command.limit_max_pos.to_byte());
                frame.extend_from_slice(&command.max_forward_pos.to_le_bytes());
                frame.extend_from_slice(&command.max_back_pos.to_le_bytes());
            }
            Self::EnableLimitSwitches(command) => {
                frame.push(command.enable as u8);
            }
            Self::Idle => (),
            Self::Throttle(command) => {
                frame.extend_from_slice(&command.throttle.to_le_bytes());
            }
            Self::Velocity(command) => {
                frame.extend_from_slice(&command.velocity.to_le_bytes());
            }
            Self::Position(command) => {
                frame.extend_from_slice(&command.position.to_le_bytes());
            }
        }

        frame
    }

    /// Decode a payload of the given kind.
    ///
    /// # Arguments
    /// * `kind` - Wire tag of the payload.
    /// * `payload` - Payload bytes without the tag byte.
    ///
    /// # Returns
    /// Decoded message.
    ///
    /// # Errors
    /// * The payload length does not match the fixed length of the variant.
    /// * The kind is an outbound tag.
    pub fn decode(kind: MessageKind, payload: &[u8]) -> Result<Self, DecodeError> {
        let expected = match kind {
            MessageKind::Adjust => AdjustCommand::PAYLOAD_SIZE,
            MessageKind::Config => ConfigCommand::PAYLOAD_SIZE,
            MessageKind::EnableLimitSwitches => EnableLimitSwitchesCommand::PAYLOAD_SIZE,
            MessageKind::Idle => 0,
            MessageKind::Throttle => ThrottleCommand::PAYLOAD_SIZE,
            MessageKind::Velocity => VelocityCommand::PAYLOAD_SIZE,
            MessageKind::Position => PositionCommand::PAYLOAD_SIZE,
            MessageKind::ControllerData => {
                return Err(DecodeError::WrongDirection(kind));
            }
        };
        if payload.len() != expected {
            return Err(DecodeError::LengthMismatch {
                kind,
                expected,
                actual: payload.len(),
            });
        }

        Ok(match kind {
            MessageKind::Adjust => Self::Adjust(AdjustCommand {
                position: get_f32(payload, 0),
            }),
            MessageKind::Config => {
                let mut limit_readj_pos = [0.0; NUM_LIMIT_SWITCH];
                for idx in 0..NUM_LIMIT_SWITCH {
                    limit_readj_pos[idx] = get_f32(payload, 8 + 4 * idx);
                }

                Self::Config(ConfigCommand {
                    gear_ratio: get_f32(payload, 0),
                    limit_switch_info_0: LimitSwitchInfo0::from_byte(payload[4]),
                    limit_switch_info_1: LimitSwitchInfo1::from_byte(payload[5]),
                    limit_switch_info_2: LimitSwitchInfo2::from_byte(payload[6]),
                    quad_abs_enc_info: EncoderInfo::from_byte(payload[7]),
                    limit_readj_pos,
                    quad_enc_out_ratio: get_f32(payload, 24),
                    abs_enc_out_ratio: get_f32(payload, 28),
                    max_pwm: get_f32(payload, 32),
                    limit_max_pos: LimitMaxPositionInfo::from_byte(payload[36]),
                    max_forward_pos: get_f32(payload, 37),
                    max_back_pos: get_f32(payload, 41),
                })
            }
            MessageKind::EnableLimitSwitches => {
                Self::EnableLimitSwitches(EnableLimitSwitchesCommand {
                    enable: payload[0] != 0,
                })
            }
            MessageKind::Idle => Self::Idle,
            MessageKind::Throttle => Self::Throttle(ThrottleCommand {
                throttle: get_f32(payload, 0),
            }),
            MessageKind::Velocity => Self::Velocity(VelocityCommand {
                velocity: get_f32(payload, 0),
            }),
            MessageKind::Position => Self::Position(PositionCommand {
                position: get_f32(payload, 0),
            }),
            MessageKind::ControllerData => unreachable!(),
        })
    }

    /// Decode a full frame.
    ///
    /// # Arguments
    /// * `frame` - Frame bytes: the tag byte followed by the payload.
    ///
    /// # Returns
    /// Decoded message.
    ///
    /// # Errors
    /// * The frame is empty or the tag byte is undefined.
    /// * The payload does not decode (see `decode`).
    pub fn from_frame(frame: &[u8]) -> Result<Self, DecodeError> {
        let (&tag, payload) = frame.split_first().ok_or(DecodeError::EmptyFrame)?;
        let kind = MessageKind::from_repr(tag).ok_or(DecodeError::UnknownKind(tag))?;

        Self::decode(kind, payload)
    }
}

impl OutboundMessage {
    /// Get the wire tag of the message.
    ///
    /// # Returns
    /// Message kind.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::ControllerData(_) => MessageKind::ControllerData,
        }
    }

    /// Encode the message into a frame.
    ///
    /// # Returns
    /// Frame bytes: the tag byte followed by the fixed-layout payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = vec![self.kind() as u8];
        match self {
            Self::ControllerData(state) => {
                frame.extend_from_slice(&state.position.to_le_bytes());
                frame.extend_from_slice(&state.velocity.to_le_bytes());
                frame.push(state.config_calib_error_info.to_byte());
                frame.push(state.limit_switches.to_byte());
            }
        }

        frame
    }

    /// Decode a payload of the given kind.
    ///
    /// # Arguments
    /// * `kind` - Wire tag of the payload.
    /// * `payload` - Payload bytes without the tag byte.
    ///
    /// # Returns
    /// Decoded message.
    ///
    /// # Errors
    /// * The payload length does not match the fixed length of the variant.
    /// * The kind is an inbound tag.
    pub fn decode(kind: MessageKind, payload: &[u8]) -> Result<Self, DecodeError> {
        match kind {
            MessageKind::ControllerData => {
                if payload.len() != ControllerDataState::PAYLOAD_SIZE {
                    return Err(DecodeError::LengthMismatch {
                        kind,
                        expected: ControllerDataState::PAYLOAD_SIZE,
                        actual: payload.len(),
                    });
                }

                Ok(Self::ControllerData(ControllerDataState {
                    position: get_f32(payload, 0),
                    velocity: get_f32(payload, 4),
                    config_calib_error_info: CalibErrorInfo::from_byte(payload[8]),
                    limit_switches: LimitStateInfo::from_byte(payload[9]),
                }))
            }
            other => Err(DecodeError::WrongDirection(other)),
        }
    }

    /// Decode a full frame.
    ///
    /// # Arguments
    /// * `frame` - Frame bytes: the tag byte followed by the payload.
    ///
    /// # Returns
    /// Decoded message.
    ///
    /// # Errors
    /// * The frame is empty or the tag byte is undefined.
    /// * The payload does not decode (see `decode`).
    pub fn from_frame(frame: &[u8]) -> Result<Self, DecodeError> {
        let (&tag, payload) = frame.split_first().ok_or(DecodeError::EmptyFrame)?;
        let kind = MessageKind::from_repr(tag).ok_or(DecodeError::UnknownKind(tag))?;

        Self::decode(kind, payload)
    }
}
