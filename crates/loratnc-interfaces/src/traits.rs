//! Radio and host-port capability traits.

use core::fmt;

use loratnc_core::constants::MAX_PACKET_SIZE;

use crate::error::InterfaceError;
use crate::gate::ReceiveGate;

/// Outcome reported by a radio driver operation.
///
/// SX127x-style drivers report signed status codes: zero is success,
/// negative values are failures, of which a payload CRC mismatch is the
/// one worth distinguishing (the packet arrived but is corrupt).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioStatus {
    Ok,
    CrcMismatch,
    OtherError(i16),
}

impl RadioStatus {
    /// CRC mismatch code used by SX127x-family drivers.
    const ERR_CRC_MISMATCH: i16 = -7;

    pub fn from_code(code: i16) -> Self {
        match code {
            0 => RadioStatus::Ok,
            Self::ERR_CRC_MISMATCH => RadioStatus::CrcMismatch,
            other => RadioStatus::OtherError(other),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, RadioStatus::Ok)
    }
}

impl fmt::Display for RadioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioStatus::Ok => write!(f, "ok"),
            RadioStatus::CrcMismatch => write!(f, "CRC mismatch"),
            RadioStatus::OtherError(code) => write!(f, "driver error {code}"),
        }
    }
}

/// The transceiver capability the bridge is written against.
///
/// Models a half-duplex packet radio: at any instant it is either armed for
/// receive or mid-transmit. Receive completion is signalled through the
/// [`ReceiveGate`]; the actual packet bytes are pulled out later, from the
/// polling context, via [`read_packet`](Radio::read_packet).
pub trait Radio: Send + Sync {
    /// Human-readable name for log lines.
    fn name(&self) -> &str;

    /// Largest on-air packet this radio accepts.
    fn mtu(&self) -> usize {
        MAX_PACKET_SIZE
    }

    /// The receive-notification gate shared with the driver context.
    fn gate(&self) -> &ReceiveGate;

    /// Transmit one packet. Takes the transceiver out of receive mode;
    /// callers re-arm with [`start_receive`](Radio::start_receive) when done
    /// sending.
    fn transmit(&self, data: &[u8]) -> impl Future<Output = Result<(), InterfaceError>> + Send;

    /// Arm the transceiver for receive.
    fn start_receive(&self) -> impl Future<Output = Result<(), InterfaceError>> + Send;

    /// Pull the most recently received packet out of the driver, if one is
    /// waiting. A spurious notification simply yields `None`.
    fn read_packet(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, InterfaceError>> + Send;
}

/// The host-facing duplex byte stream.
pub trait HostPort: Send + Sync {
    /// Human-readable name for log lines.
    fn name(&self) -> &str;

    /// Wait for the next chunk of bytes from the host (possibly a single
    /// byte). Returns [`InterfaceError::Stopped`] once the stream is gone.
    fn read_bytes(&self) -> impl Future<Output = Result<Vec<u8>, InterfaceError>> + Send;

    /// Write bytes toward the host.
    fn write_bytes(&self, data: &[u8]) -> impl Future<Output = Result<(), InterfaceError>> + Send;
}

// The bridge takes endpoints by value; `Arc` delegation lets tests and
// callers keep a handle to the same endpoint.
impl<R: Radio> Radio for std::sync::Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn mtu(&self) -> usize {
        (**self).mtu()
    }

    fn gate(&self) -> &ReceiveGate {
        (**self).gate()
    }

    async fn transmit(&self, data: &[u8]) -> Result<(), InterfaceError> {
        (**self).transmit(data).await
    }

    async fn start_receive(&self) -> Result<(), InterfaceError> {
        (**self).start_receive().await
    }

    async fn read_packet(&self) -> Result<Option<Vec<u8>>, InterfaceError> {
        (**self).read_packet().await
    }
}

impl<H: HostPort> HostPort for std::sync::Arc<H> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, InterfaceError> {
        (**self).read_bytes().await
    }

    async fn write_bytes(&self, data: &[u8]) -> Result<(), InterfaceError> {
        (**self).write_bytes(data).await
    }
}
