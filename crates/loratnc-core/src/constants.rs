//! Protocol constants for the fragmentation link layer.

/// Maximum on-air packet size the radio hardware will accept.
pub const MAX_PACKET_SIZE: usize = 63;

/// Fragment header size: sequence(1) + total(1) + payload_len(1).
pub const FRAGMENT_HEADER_SIZE: usize = 3;

/// Payload bytes carried by a single fragment.
pub const MAX_PAYLOAD_SIZE: usize = MAX_PACKET_SIZE - FRAGMENT_HEADER_SIZE;

/// Ceiling on a complete host-side message.
pub const MAX_MESSAGE_SIZE: usize = 1024;

/// The total-count header field is one byte, so a message can never span
/// more than 255 fragments.
pub const MAX_FRAGMENTS: usize = 255;

// The configuration must keep every message expressible in the one-byte
// total-count field.
const _: () = assert!(MAX_MESSAGE_SIZE.div_ceil(MAX_PAYLOAD_SIZE) <= MAX_FRAGMENTS);

/// Number of fragments needed to carry a message of `len` bytes.
pub const fn fragment_count(len: usize) -> usize {
    len.div_ceil(MAX_PAYLOAD_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_size_leaves_room_for_header() {
        assert_eq!(MAX_PAYLOAD_SIZE + FRAGMENT_HEADER_SIZE, MAX_PACKET_SIZE);
        assert_eq!(MAX_PAYLOAD_SIZE, 60);
    }

    #[test]
    fn fragment_count_boundaries() {
        assert_eq!(fragment_count(1), 1);
        assert_eq!(fragment_count(MAX_PAYLOAD_SIZE), 1);
        assert_eq!(fragment_count(MAX_PAYLOAD_SIZE + 1), 2);
        assert_eq!(fragment_count(MAX_MESSAGE_SIZE), 18);
    }
}
