//! Message fragmentation: split a host message into bounded on-air packets.
//!
//! Pure function, no I/O. Driving the packets through the radio (in strict
//! ascending order, fire-and-forget) is the bridge's job.

use loratnc_core::constants::{MAX_MESSAGE_SIZE, MAX_PAYLOAD_SIZE, fragment_count};
use loratnc_core::packet::wire::FragmentHeader;

use crate::error::FragmentError;

/// Split a message into `ceil(len / MAX_PAYLOAD_SIZE)` wire-ready packets.
///
/// Each packet is a 3-byte header followed by up to `MAX_PAYLOAD_SIZE`
/// payload bytes; only the final fragment may be short. Sequence numbers
/// ascend from zero in the returned order.
pub fn fragment(message: &[u8]) -> Result<Vec<Vec<u8>>, FragmentError> {
    fragment_with_limit(message, MAX_MESSAGE_SIZE)
}

/// [`fragment`] with an explicit message ceiling.
///
/// The ceiling must keep the fragment count within the one-byte total
/// field; that is a configuration invariant, checked here as a hard error
/// rather than a panic.
pub fn fragment_with_limit(
    message: &[u8],
    max_message: usize,
) -> Result<Vec<Vec<u8>>, FragmentError> {
    if message.is_empty() {
        return Err(FragmentError::Empty);
    }
    if message.len() > max_message || fragment_count(message.len()) > u8::MAX as usize {
        return Err(FragmentError::TooLarge {
            len: message.len(),
            max: max_message,
        });
    }

    let total = fragment_count(message.len()) as u8;
    let mut packets = Vec::with_capacity(total as usize);

    for (sequence, chunk) in message.chunks(MAX_PAYLOAD_SIZE).enumerate() {
        let header = FragmentHeader {
            sequence: sequence as u8,
            total,
            payload_len: chunk.len() as u8,
        };
        let mut packet = Vec::with_capacity(header.encode().len() + chunk.len());
        packet.extend_from_slice(&header.encode());
        packet.extend_from_slice(chunk);
        packets.push(packet);
    }

    Ok(packets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loratnc_core::constants::MAX_PACKET_SIZE;

    #[test]
    fn short_message_is_a_single_fragment() {
        let msg = vec![0x42; MAX_PAYLOAD_SIZE];
        let packets = fragment(&msg).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0][0], 0); // sequence
        assert_eq!(packets[0][1], 1); // total
        assert_eq!(packets[0][2], MAX_PAYLOAD_SIZE as u8);
        assert_eq!(&packets[0][3..], msg.as_slice());
    }

    #[test]
    fn splits_across_payload_boundary() {
        let msg = vec![0x13; MAX_PAYLOAD_SIZE + 1];
        let packets = fragment(&msg).unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0][2], MAX_PAYLOAD_SIZE as u8);
        assert_eq!(packets[1][..3], [1, 2, 1]);
        assert_eq!(packets[1].len(), 4);
    }

    #[test]
    fn sequences_ascend_and_packets_stay_bounded() {
        let msg: Vec<u8> = (0..200u16).map(|i| i as u8).collect();
        let packets = fragment(&msg).unwrap();
        assert_eq!(packets.len(), 4);
        for (i, packet) in packets.iter().enumerate() {
            assert_eq!(packet[0] as usize, i);
            assert_eq!(packet[1], 4);
            assert!(packet.len() <= MAX_PACKET_SIZE);
        }
    }

    #[test]
    fn payload_bytes_cover_the_message_exactly() {
        let msg: Vec<u8> = (0..150u8).collect();
        let packets = fragment(&msg).unwrap();
        let rebuilt: Vec<u8> = packets.iter().flat_map(|p| p[3..].to_vec()).collect();
        assert_eq!(rebuilt, msg);
    }

    #[test]
    fn empty_message_is_rejected() {
        assert_eq!(fragment(&[]), Err(FragmentError::Empty));
    }

    #[test]
    fn oversized_message_is_rejected() {
        let msg = vec![0; MAX_MESSAGE_SIZE + 1];
        assert!(matches!(
            fragment(&msg),
            Err(FragmentError::TooLarge { .. })
        ));
    }
}
