//! Bridge orchestrator for the loratnc fragmenting KISS TNC.
//!
//! Wires the host byte stream, the KISS framing codec, the fragmentation
//! and reassembly state machines, and the radio capability into one
//! cooperative event loop.

pub mod bridge;
pub mod config;
pub mod error;
pub mod logging;

pub use bridge::{Bridge, ShutdownHandle};
pub use config::BridgeConfig;
pub use error::BridgeError;
