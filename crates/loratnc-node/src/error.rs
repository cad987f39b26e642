//! Error types for the bridge orchestrator.

use loratnc_interfaces::InterfaceError;

/// Errors that can occur while setting up or running the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("interface error: {0}")]
    Interface(#[from] InterfaceError),
}
