//! Order-independent message reassembly.
//!
//! Fragments of one message may arrive reordered, duplicated, or not at
//! all. The reassembler tracks the current message with a bitmap of
//! received sequence numbers and emits the message exactly once, when
//! every fragment is present.
//!
//! Known correctness gap, preserved from the wire format: there is no
//! message-identity field beyond the total fragment count. Two unrelated
//! messages with the same count arriving back-to-back can interleave
//! fragments and corrupt both. A fragment declaring a *different* total
//! restarts tracking; a message that never completes is otherwise kept
//! indefinitely (no timeout).

use loratnc_core::constants::{MAX_MESSAGE_SIZE, MAX_PAYLOAD_SIZE};
use loratnc_core::packet::wire::FragmentHeader;

/// Bitmap of up to 256 received sequence numbers.
#[derive(Debug, Clone, Copy, Default)]
struct SequenceBitmap([u64; 4]);

impl SequenceBitmap {
    fn contains(&self, sequence: u8) -> bool {
        self.0[(sequence >> 6) as usize] & (1 << (sequence & 0x3F)) != 0
    }

    fn insert(&mut self, sequence: u8) {
        self.0[(sequence >> 6) as usize] |= 1 << (sequence & 0x3F);
    }

    fn clear(&mut self) {
        self.0 = [0; 4];
    }
}

/// Reassembly state for the single in-flight inbound message.
#[derive(Debug)]
pub struct Reassembler {
    /// Total count declared by the message currently being tracked.
    expected_total: Option<u8>,
    received_map: SequenceBitmap,
    received: u8,
    /// Payload length of the final fragment, once it has arrived. Needed to
    /// compute the message length regardless of arrival order.
    last_payload_len: u8,
    buffer: Vec<u8>,
}

impl Reassembler {
    /// Create a reassembler with the default message ceiling.
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGE_SIZE)
    }

    /// Create a reassembler accepting messages up to `max_message` bytes.
    pub fn with_capacity(max_message: usize) -> Self {
        Self {
            expected_total: None,
            received_map: SequenceBitmap::default(),
            received: 0,
            last_payload_len: 0,
            buffer: vec![0; max_message],
        }
    }

    /// Accept one inbound packet. Returns the completed message when this
    /// packet was the last missing fragment.
    ///
    /// Malformed packets and duplicates are ignored; a packet declaring a
    /// total different from the tracked one is treated as the start of a
    /// new message. Applying any single packet twice is idempotent.
    pub fn accept(&mut self, packet: &[u8]) -> Option<Vec<u8>> {
        let Ok((header, payload)) = FragmentHeader::parse(packet) else {
            return None;
        };

        // A differing total means this fragment belongs to a new message;
        // abandon whatever was in flight.
        if self.expected_total != Some(header.total) {
            self.restart(header.total);
        }

        if self.received_map.contains(header.sequence) {
            return None;
        }

        let offset = header.sequence as usize * MAX_PAYLOAD_SIZE;
        let end = offset + payload.len();
        if end > self.buffer.len() {
            // A fragment placed past the buffer: the claimed geometry can
            // never fit, so drop the whole attempt.
            self.reset();
            return None;
        }

        self.buffer[offset..end].copy_from_slice(payload);
        self.received_map.insert(header.sequence);
        self.received += 1;
        if header.sequence == header.total - 1 {
            self.last_payload_len = header.payload_len;
        }

        if self.received == header.total {
            let len =
                (header.total as usize - 1) * MAX_PAYLOAD_SIZE + self.last_payload_len as usize;
            let message = self.buffer[..len].to_vec();
            self.reset();
            Some(message)
        } else {
            None
        }
    }

    /// Total count of the message currently being tracked, if any.
    pub fn expected_total(&self) -> Option<u8> {
        self.expected_total
    }

    /// Number of distinct fragments received for the current message.
    pub fn received_count(&self) -> u8 {
        self.received
    }

    /// Begin tracking a message with the given total count.
    fn restart(&mut self, total: u8) {
        self.expected_total = Some(total);
        self.received_map.clear();
        self.received = 0;
        self.last_payload_len = 0;
    }

    /// Drop all tracking state.
    fn reset(&mut self) {
        self.expected_total = None;
        self.received_map.clear();
        self.received = 0;
        self.last_payload_len = 0;
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::fragment;

    #[test]
    fn truncated_header_is_ignored() {
        let mut r = Reassembler::new();
        assert_eq!(r.accept(&[0, 2]), None);
        assert_eq!(r.expected_total(), None);
    }

    #[test]
    fn invalid_sequence_is_ignored() {
        let mut r = Reassembler::new();
        // sequence == total
        assert_eq!(r.accept(&[2, 2, 1, 0xAA]), None);
        assert_eq!(r.received_count(), 0);
    }

    #[test]
    fn single_fragment_completes_immediately() {
        let mut r = Reassembler::new();
        let packets = fragment(b"hello").unwrap();
        assert_eq!(r.accept(&packets[0]), Some(b"hello".to_vec()));
        // State resets after completion.
        assert_eq!(r.expected_total(), None);
        assert_eq!(r.received_count(), 0);
    }

    #[test]
    fn duplicate_does_not_advance_count() {
        let mut r = Reassembler::new();
        let msg = vec![0x77; 130];
        let packets = fragment(&msg).unwrap();
        assert_eq!(packets.len(), 3);

        assert_eq!(r.accept(&packets[0]), None);
        assert_eq!(r.received_count(), 1);
        assert_eq!(r.accept(&packets[0]), None);
        assert_eq!(r.received_count(), 1);

        assert_eq!(r.accept(&packets[1]), None);
        assert_eq!(r.accept(&packets[2]), Some(msg));
    }

    #[test]
    fn differing_total_restarts_tracking() {
        let mut r = Reassembler::new();
        let long = fragment(&vec![0x01; 130]).unwrap(); // total = 3
        let short = fragment(&vec![0x02; 70]).unwrap(); // total = 2

        assert_eq!(r.accept(&long[0]), None);
        assert_eq!(r.accept(&long[1]), None);
        assert_eq!(r.received_count(), 2);

        // A total=2 fragment abandons the total=3 message.
        assert_eq!(r.accept(&short[1]), None);
        assert_eq!(r.expected_total(), Some(2));
        assert_eq!(r.received_count(), 1);

        assert_eq!(r.accept(&short[0]), Some(vec![0x02; 70]));
    }

    #[test]
    fn geometry_past_the_buffer_resets() {
        let mut r = Reassembler::new();
        // sequence 254 of 255 would land at offset 15240, far past the
        // 1024-byte buffer.
        let mut packet = vec![254, 255, 60];
        packet.extend_from_slice(&[0; 60]);
        assert_eq!(r.accept(&packet), None);
        assert_eq!(r.expected_total(), None);

        // Still works afterwards.
        let packets = fragment(b"ok").unwrap();
        assert_eq!(r.accept(&packets[0]), Some(b"ok".to_vec()));
    }

    #[test]
    fn last_fragment_first_still_sizes_correctly() {
        let mut r = Reassembler::new();
        let msg: Vec<u8> = (0..125u8).collect(); // 3 fragments, last is 5 bytes
        let packets = fragment(&msg).unwrap();

        assert_eq!(r.accept(&packets[2]), None);
        assert_eq!(r.accept(&packets[0]), None);
        assert_eq!(r.accept(&packets[1]), Some(msg));
    }
}
