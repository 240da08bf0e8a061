use num_traits::PrimInt;
use strum_macros::{AsRefStr, EnumIter, FromRepr};

/// A trait to provide value and bit value methods for the bit enum.
pub trait BitEnum<T: PrimInt> {
    /// Get the value.
    ///
    /// # Returns
    /// Value.
    fn value(&self) -> T;

    /// Get the bit value.
    ///
    /// # Returns
    /// Bit value. If the value is not defined, it returns 0.
    fn bit_value(&self) -> T {
        match self.value().to_usize() {
            Some(value) => T::one() << value,
            None => T::zero(),
        }
    }
}

impl BitEnum<u8> for CalibErrorBit {
    fn value(&self) -> u8 {
        *self as u8
    }
}

impl BitEnum<u8> for EncoderInfoBit {
    fn value(&self) -> u8 {
        *self as u8
    }
}

impl BitEnum<u8> for LimitMaxPositionBit {
    fn value(&self) -> u8 {
        *self as u8
    }
}

/// Wire tag of a message. The tag values follow the variant order of the
/// inbound and outbound message unions and are part of the wire contract.
#[derive(FromRepr, Debug, PartialEq, Clone, Copy, Hash, Eq, AsRefStr)]
#[repr(u8)]
pub enum MessageKind {
    Adjust = 0,
    Config = 1,
    EnableLimitSwitches = 2,
    Idle = 3,
    Throttle = 4,
    Velocity = 5,
    Position = 6,
    ControllerData = 7,
}

/// Tag of the control mode.
#[derive(FromRepr, Debug, PartialEq, Clone, Copy, AsRefStr)]
#[repr(u8)]
pub enum ModeKind {
    None = 0,
    Position = 1,
    Velocity = 2,
}

/// Error code reported in the calibration/error byte of the telemetry. Only
/// 4 bits are available on the wire, so the maximum value is 15.
#[derive(FromRepr, Debug, Default, PartialEq, Eq, Clone, Copy, AsRefStr)]
#[repr(u8)]
pub enum ErrorCode {
    #[default]
    NoError = 0,
    ConfigInvalid = 1,
    EncoderFault = 2,
    OutputFault = 3,
}

/// Bit of the calibration/error byte. Bits 0-1 are reserved and bits 4-7
/// carry the error code.
#[derive(Debug, PartialEq, Clone, Copy, EnumIter)]
pub enum CalibErrorBit {
    Configured = 2,
    Calibrated = 3,
}

/// Bit of the encoder configuration byte. Bits 0-3 are reserved.
#[derive(Debug, PartialEq, Clone, Copy, EnumIter)]
pub enum EncoderInfoBit {
    QuadPresent = 4,
    QuadForwardPolarity = 5,
    AbsPresent = 6,
    AbsForwardPolarity = 7,
}

/// Bit of the travel-limit byte. Bits 0-5 are reserved.
#[derive(Debug, PartialEq, Clone, Copy, EnumIter)]
pub enum LimitMaxPositionBit {
    MaxForward = 6,
    MaxBackward = 7,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_kind_value() {
        // Get the enum from the repr.
        assert_eq!(MessageKind::from_repr(0).unwrap(), MessageKind::Adjust);
        assert_eq!(MessageKind::from_repr(6).unwrap(), MessageKind::Position);
        assert_eq!(
            MessageKind::from_repr(7).unwrap(),
            MessageKind::ControllerData
        );

        assert!(MessageKind::from_repr(8).is_none());

        // Get the enum value.
        assert_eq!(MessageKind::Idle as u8, 3);
        assert_eq!(MessageKind::Throttle as u8, 4);
    }

    #[test]
    fn test_mode_kind_name() {
        assert_eq!(ModeKind::None.as_ref(), "None");
        assert_eq!(ModeKind::Position.as_ref(), "Position");
        assert_eq!(ModeKind::Velocity.as_ref(), "Velocity");
    }

    #[test]
    fn test_error_code_value() {
        assert_eq!(ErrorCode::NoError as u8, 0);
        assert_eq!(ErrorCode::from_repr(2).unwrap(), ErrorCode::EncoderFault);

        assert!(ErrorCode::from_repr(4).is_none());
    }

    #[test]
    fn test_calib_error_bit_value() {
        assert_eq!(CalibErrorBit::Configured.bit_value(), 0b0000_0100);
        assert_eq!(CalibErrorBit::Calibrated.bit_value(), 0b0000_1000);
    }

    #[test]
    fn test_encoder_info_bit_value() {
        assert_eq!(EncoderInfoBit::QuadPresent.bit_value(), 0b0001_0000);
        assert_eq!(EncoderInfoBit::AbsForwardPolarity.bit_value(), 0b1000_0000);
    }

    #[test]
    fn test_limit_max_position_bit_value() {
        assert_eq!(LimitMaxPositionBit::MaxForward.bit_value(), 0b0100_0000);
        assert_eq!(LimitMaxPositionBit::MaxBackward.bit_value(), 0b1000_0000);
    }
}
