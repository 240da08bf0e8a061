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

use log::warn;

use crate::constants::{CAN_LEGACY_IDENTIFIER, SUPPORTED_FRAME_SIZES};

/// Header of an outbound frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TxHeader {
    pub identifier: u32,
    // 29-bit addressed identifier if true. Otherwise, the 11-bit legacy one.
    pub is_extended: bool,
    // Payload length after the rounding to a supported frame size.
    pub frame_size: usize,
}

/// Header of a received frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RxHeader {
    pub identifier: u32,
    pub is_extended: bool,
}

/// Capability over the broadcast bus hardware. The bus logic owns exactly one
/// value of this; nothing else touches the peripheral.
pub trait CanInterface {
    /// Run the hardware start sequence.
    ///
    /// # Returns
    /// Ok if the peripheral started. Otherwise, an error message.
    fn start(&mut self) -> Result<(), &'static str>;

    /// Get the number of free slots in the outbound mailbox.
    ///
    /// # Returns
    /// Number of free slots.
    fn free_mailbox_slots(&self) -> usize;

    /// Put a frame into the outbound mailbox. The caller has checked the free
    /// capacity.
    ///
    /// # Arguments
    /// * `header` - Frame header.
    /// * `payload` - Payload padded to the rounded frame size.
    fn enqueue(&mut self, header: TxHeader, payload: &[u8]);

    /// Abort the oldest pending transmission to make room for a new frame.
    fn abort_oldest_pending(&mut self);

    /// Poll the receive queue.
    ///
    /// # Returns
    /// The header and the payload of the next frame, if any.
    fn poll_receive(&mut self) -> Option<(RxHeader, Vec<u8>)>;
}

/// Addressed identifier of a broadcast frame: bits 0-7 destination, bits 8-14
/// source, bit 15 reply-required, bits 16-31 reserved.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MessageId {
    pub destination: u8,
    // Only 7 bits are available on the wire.
    pub source: u8,
    pub reply_required: bool,
}

impl MessageId {
    /// Compose the 29-bit identifier.
    ///
    /// # Returns
    /// Identifier.
    pub fn to_identifier(&self) -> u32 {
        (self.destination as u32)
            | (((self.source & 0x7F) as u32) << 8)
            | ((self.reply_required as u32) << 15)
    }

    /// Decompose the 29-bit identifier.
    ///
    /// # Arguments
    /// * `identifier` - Identifier.
    ///
    /// # Returns
    /// Message identifier fields.
    pub fn from_identifier(identifier: u32) -> Self {
        Self {
            destination: (identifier & 0xFF) as u8,
            source: ((identifier >> 8) & 0x7F) as u8,
            reply_required: identifier & (1 << 15) != 0,
        }
    }
}

/// Round a payload length up to the nearest supported frame size.
///
/// # Notes
/// The mapping is monotonic: the result is the smallest supported size that
/// holds the request. Every payload that can reach the bus belongs to the
/// statically checked message catalogue, so the oversized branch is a
/// build-time error when evaluated in a const context and is unreachable at
/// runtime.
///
/// # Arguments
/// * `size` - Requested payload length in bytes.
///
/// # Returns
/// Supported frame size in bytes.
pub const fn nearest_frame_size(size: usize) -> usize {
    let mut idx = 0;
    while idx < SUPPORTED_FRAME_SIZES.len() {
        if size <= SUPPORTED_FRAME_SIZES[idx] {
            return SUPPORTED_FRAME_SIZES[idx];
        }

        idx += 1;
    }

    panic!("The payload does not fit a single frame.");
}

/// Broadcast/receive bus. Receiving is a non-blocking poll. Broadcasting is
/// lossy under pressure: a full mailbox drops its oldest pending frame so the
/// freshest data wins, and a sender must not assume delivery of every frame.
pub struct FdCanBus<I: CanInterface> {
    pub interface: I,
    _source: u8,
    _destination: u8,
}

impl<I: CanInterface> FdCanBus<I> {
    /// Create a new broadcast bus and start the hardware.
    ///
    /// # Notes
    /// A start failure is an unrecoverable initialization fault. There is no
    /// retry path; the caller fails fast at its construction boundary.
    ///
    /// # Arguments
    /// * `source` - Source address of this node.
    /// * `destination` - Destination address of the supervisory host.
    /// * `interface` - Bus hardware capability.
    ///
    /// # Returns
    /// A new broadcast bus.
    ///
    /// # Errors
    /// * The hardware start sequence cannot be completed.
    pub fn new(source: u8, destination: u8, mut interface: I) -> Result<Self, &'static str> {
        interface.start()?;

        Ok(Self {
            interface,
            _source: source,
            _destination: destination,
        })
    }

    /// Poll the receive queue.
    ///
    /// # Returns
    /// The header and the payload of the next frame, if any.
    pub fn receive(&mut self) -> Option<(RxHeader, Vec<u8>)> {
        self.interface.poll_receive()
    }

    /// Broadcast a frame with the addressed identifier.
    ///
    /// # Arguments
    /// * `payload` - Payload bytes.
    pub fn broadcast(&mut self, payload: &[u8]) {
        let identifier = MessageId {
            destination: self._destination,
            source: self._source,
            reply_required: false,
        }
        .to_identifier();

        self.send(identifier, true, payload);
    }

    /// Broadcast a frame with the fixed legacy identifier.
    ///
    /// # Arguments
    /// * `payload` - Payload bytes.
    pub fn broadcast_legacy(&mut self, payload: &[u8]) {
        self.send(CAN_LEGACY_IDENTIFIER, false, payload);
    }

    /// Round the payload up, apply the mailbox discipline, and enqueue.
    ///
    /// # Arguments
    /// * `identifier` - Frame identifier.
    /// * `is_extended` - Use the 29-bit identifier or not.
    /// * `payload` - Payload bytes.
    fn send(&mut self, identifier: u32, is_extended: bool, payload: &[u8]) {
        let frame_size = nearest_frame_size(payload.len());

        let mut frame = payload.to_vec();
        frame.resize(frame_size, 0);

        if self.interface.free_mailbox_slots() == 0 {
            warn!("The outbound mailbox is full. Aborting the oldest pending frame.");

            self.interface.abort_oldest_pending();
        }

        self.interface.enqueue(
            TxHeader {
                identifier,
                is_extended,
                frame_size,
            },
            &frame,
        );
    }
}
