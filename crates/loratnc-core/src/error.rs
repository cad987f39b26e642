//! Error types for the loratnc-core crate.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    TooShort { min: usize, actual: usize },
    ZeroTotal,
    SequenceOutOfRange { sequence: u8, total: u8 },
    PayloadTooLong { len: u8, max: usize },
    Truncated { declared: usize, actual: usize },
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::TooShort { min, actual } => {
                write!(
                    f,
                    "packet too short: need at least {min} bytes, got {actual}"
                )
            }
            PacketError::ZeroTotal => write!(f, "fragment total count is zero"),
            PacketError::SequenceOutOfRange { sequence, total } => {
                write!(f, "sequence {sequence} out of range for total {total}")
            }
            PacketError::PayloadTooLong { len, max } => {
                write!(f, "declared payload length {len} exceeds maximum {max}")
            }
            PacketError::Truncated { declared, actual } => {
                write!(
                    f,
                    "packet truncated: header declares {declared} payload bytes, {actual} present"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PacketError {}
