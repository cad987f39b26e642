//! Fragment header wire format parsing and serialization.
//!
//! Every on-air packet starts with a 3-byte header:
//! byte 0 = sequence (0-based), byte 1 = total fragment count,
//! byte 2 = this fragment's payload length. Payload bytes follow.

use crate::constants::{FRAGMENT_HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::error::PacketError;

/// Parsed fragment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentHeader {
    /// 0-based position of this fragment within the message.
    pub sequence: u8,
    /// Total number of fragments in the message.
    pub total: u8,
    /// Number of payload bytes carried by this fragment.
    pub payload_len: u8,
}

impl FragmentHeader {
    /// Parse a header from raw packet bytes, returning it together with the
    /// payload slice it describes.
    ///
    /// The radio driver may hand back a buffer longer than the fragment
    /// actually is; trailing bytes beyond `payload_len` are ignored.
    pub fn parse(raw: &[u8]) -> Result<(Self, &[u8]), PacketError> {
        if raw.len() < FRAGMENT_HEADER_SIZE {
            return Err(PacketError::TooShort {
                min: FRAGMENT_HEADER_SIZE,
                actual: raw.len(),
            });
        }

        let header = FragmentHeader {
            sequence: raw[0],
            total: raw[1],
            payload_len: raw[2],
        };

        if header.total == 0 {
            return Err(PacketError::ZeroTotal);
        }
        if header.sequence >= header.total {
            return Err(PacketError::SequenceOutOfRange {
                sequence: header.sequence,
                total: header.total,
            });
        }
        if header.payload_len as usize > MAX_PAYLOAD_SIZE {
            return Err(PacketError::PayloadTooLong {
                len: header.payload_len,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let declared = header.payload_len as usize;
        let available = raw.len() - FRAGMENT_HEADER_SIZE;
        if available < declared {
            return Err(PacketError::Truncated {
                declared,
                actual: available,
            });
        }

        let payload = &raw[FRAGMENT_HEADER_SIZE..FRAGMENT_HEADER_SIZE + declared];
        Ok((header, payload))
    }

    /// Serialize the header to its 3-byte wire form.
    pub fn encode(&self) -> [u8; FRAGMENT_HEADER_SIZE] {
        [self.sequence, self.total, self.payload_len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip() {
        let header = FragmentHeader {
            sequence: 2,
            total: 5,
            payload_len: 4,
        };
        let mut raw = header.encode().to_vec();
        raw.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let (parsed, payload) = FragmentHeader::parse(&raw).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(payload, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn trailing_driver_padding_is_ignored() {
        // A fixed 64-byte driver buffer with a 2-byte payload inside.
        let mut raw = [0u8; 64];
        raw[0] = 0;
        raw[1] = 1;
        raw[2] = 2;
        raw[3] = 0x41;
        raw[4] = 0x42;

        let (header, payload) = FragmentHeader::parse(&raw).unwrap();
        assert_eq!(header.payload_len, 2);
        assert_eq!(payload, b"AB");
    }

    #[test]
    fn rejects_short_packets() {
        assert!(matches!(
            FragmentHeader::parse(&[]),
            Err(PacketError::TooShort { .. })
        ));
        assert!(matches!(
            FragmentHeader::parse(&[0, 1]),
            Err(PacketError::TooShort { .. })
        ));
    }

    #[test]
    fn rejects_zero_total() {
        assert_eq!(
            FragmentHeader::parse(&[0, 0, 0]),
            Err(PacketError::ZeroTotal)
        );
    }

    #[test]
    fn rejects_sequence_at_or_past_total() {
        assert!(matches!(
            FragmentHeader::parse(&[3, 3, 0]),
            Err(PacketError::SequenceOutOfRange { .. })
        ));
        assert!(matches!(
            FragmentHeader::parse(&[7, 3, 0]),
            Err(PacketError::SequenceOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_oversized_payload_length() {
        assert!(matches!(
            FragmentHeader::parse(&[0, 1, 61]),
            Err(PacketError::PayloadTooLong { len: 61, .. })
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        // Header declares 5 payload bytes but only 2 are present.
        assert_eq!(
            FragmentHeader::parse(&[0, 1, 5, 0xAA, 0xBB]),
            Err(PacketError::Truncated {
                declared: 5,
                actual: 2
            })
        );
    }
}
