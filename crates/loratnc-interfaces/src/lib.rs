//! I/O capabilities for the loratnc bridge.
//!
//! Defines the [`Radio`] and [`HostPort`] traits the bridge is written
//! against, the [`ReceiveGate`] that carries receive notifications from the
//! driver context into the polling loop, a UDP loopback radio for bench
//! testing, a TCP-served host port, and in-memory testing doubles.

pub mod error;
pub mod gate;
pub mod tcp_host;
pub mod testing;
pub mod traits;
pub mod udp;

pub use error::InterfaceError;
pub use gate::ReceiveGate;
pub use tcp_host::{TcpHostConfig, TcpHostPort};
pub use traits::{HostPort, Radio, RadioStatus};
pub use udp::{UdpRadio, UdpRadioConfig};
