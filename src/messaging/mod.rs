pub mod messages;

use thiserror::Error;

use crate::enums::MessageKind;

/// Typed error of the decode boundary. Every malformed or unrouted frame is
/// rejected here; nothing downstream sees a partially decoded message.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum DecodeError {
    #[error("payload of {kind:?} should be {expected} bytes, got {actual}")]
    LengthMismatch {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },
    #[error("unknown message kind tag {0}")]
    UnknownKind(u8),
    #[error("message kind {0:?} does not travel in this direction")]
    WrongDirection(MessageKind),
    #[error("frame is empty")]
    EmptyFrame,
}
