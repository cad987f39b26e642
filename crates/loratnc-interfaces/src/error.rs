//! Error types for the interfaces layer.

use crate::traits::RadioStatus;

/// Errors that can occur on a radio or host-port capability.
#[derive(Debug, thiserror::Error)]
pub enum InterfaceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("endpoint not connected")]
    NotConnected,
    #[error("endpoint stopped")]
    Stopped,
    #[error("packet too large: {len} bytes (max {max})")]
    PacketTooLarge { len: usize, max: usize },
    #[error("transmit failed: {0}")]
    TransmitFailed(String),
    #[error("radio reported {0}")]
    Radio(RadioStatus),
    #[error("configuration error: {0}")]
    Configuration(String),
}
