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

use std::collections::VecDeque;

use crate::bus::can_bus::{CanInterface, RxHeader, TxHeader};

/// Mock broadcast-bus peripheral with a bounded outbound mailbox and an
/// unbounded receive queue.
pub struct MockCanInterface {
    pub is_started: bool,
    // Reject the next start sequence.
    pub fail_start: bool,
    // Pending outbound frames, oldest at the front.
    pub mailbox: VecDeque<(TxHeader, Vec<u8>)>,
    // Frames that were aborted to make room.
    pub aborted: Vec<(TxHeader, Vec<u8>)>,
    _mailbox_capacity: usize,
    _receive_queue: VecDeque<(RxHeader, Vec<u8>)>,
}

impl MockCanInterface {
    /// Create a new mock broadcast-bus peripheral.
    ///
    /// # Arguments
    /// * `mailbox_capacity` - Capacity of the outbound mailbox.
    ///
    /// # Returns
    /// A new mock peripheral.
    pub fn new(mailbox_capacity: usize) -> Self {
        Self {
            is_started: false,
            fail_start: false,
            mailbox: VecDeque::new(),
            aborted: Vec::new(),
            _mailbox_capacity: mailbox_capacity,
            _receive_queue: VecDeque::new(),
        }
    }

    /// Put a frame into the receive queue as if it arrived from the wire.
    ///
    /// # Arguments
    /// * `identifier` - Frame identifier.
    /// * `payload` - Payload bytes.
    pub fn push_receive_frame(&mut self, identifier: u32, payload: &[u8]) {
        self._receive_queue.push_back((
            RxHeader {
                identifier,
                is_extended: true,
            },
            payload.to_vec(),
        ));
    }
}

impl CanInterface for MockCanInterface {
    fn start(&mut self) -> Result<(), &'static str> {
        if self.fail_start {
            return Err("Mock start failure.");
        }

        self.is_started = true;

        Ok(())
    }

    fn free_mailbox_slots(&self) -> usize {
        self._mailbox_capacity - self.mailbox.len()
    }

    fn enqueue(&mut self, header: TxHeader, payload: &[u8]) {
        self.mailbox.push_back((header, payload.to_vec()));
    }

    fn abort_oldest_pending(&mut self) {
        if let Some(frame) = self.mailbox.pop_front() {
            self.aborted.push(frame);
        }
    }

    fn poll_receive(&mut self) -> Option<(RxHeader, Vec<u8>)> {
        self._receive_queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start() {
        let mut interface = MockCanInterface::new(3);

        assert!(interface.start().is_ok());
        assert!(interface.is_started);

        interface.fail_start = true;

        assert!(interface.start().is_err());
    }

    #[test]
    fn test_mailbox() {
        let mut interface = MockCanInterface::new(2);
        let header = TxHeader {
            identifier: 0x20,
            is_extended: true,
            frame_size: 1,
        };

        assert_eq!(interface.free_mailbox_slots(), 2);

        interface.enqueue(header, &[1]);
        interface.enqueue(header, &[2]);

        assert_eq!(interface.free_mailbox_slots(), 0);

        interface.abort_oldest_pending();

        assert_eq!(interface.free_mailbox_slots(), 1);
        assert_eq!(interface.aborted[0].1, vec![1]);
        assert_eq!(interface.mailbox.front().unwrap().1, vec![2]);
    }

    #[test]
    fn test_poll_receive() {
        let mut interface = MockCanInterface::new(3);

        assert!(interface.poll_receive().is_none());

        interface.push_receive_frame(0x20, &[3]);

        let (header, payload) = interface.poll_receive().unwrap();

        assert_eq!(header.identifier, 0x20);
        assert!(header.is_extended);
        assert_eq!(payload, vec![3]);
    }
}
