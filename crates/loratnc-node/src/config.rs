//! TOML-based configuration for the bridge binary.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use loratnc_core::constants::{MAX_FRAGMENTS, MAX_MESSAGE_SIZE, MAX_PAYLOAD_SIZE};

use crate::error::BridgeError;

/// Top-level bridge configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub bridge: BridgeSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub host: HostSection,
    #[serde(default)]
    pub radio: RadioSection,
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("failed to read config file: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, BridgeError> {
        let config: Self = toml::from_str(s)
            .map_err(|e| BridgeError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the wire format imposes on the configuration.
    pub fn validate(&self) -> Result<(), BridgeError> {
        let max = self.bridge.max_message_size;
        if max == 0 {
            return Err(BridgeError::Config(
                "bridge.max_message_size must be positive".into(),
            ));
        }
        // The one-byte total-count field caps how many fragments a message
        // may span.
        if max.div_ceil(MAX_PAYLOAD_SIZE) > MAX_FRAGMENTS {
            return Err(BridgeError::Config(format!(
                "bridge.max_message_size {} needs more than {} fragments",
                max, MAX_FRAGMENTS
            )));
        }
        Ok(())
    }
}

/// The `[bridge]` section.
#[derive(Debug, Deserialize)]
pub struct BridgeSection {
    /// Largest host message accepted for fragmentation, in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

fn default_max_message_size() -> usize {
    MAX_MESSAGE_SIZE
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            max_message_size: default_max_message_size(),
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    /// Default log level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// The `[host]` section.
#[derive(Debug, Deserialize)]
pub struct HostSection {
    /// Address the host-facing TCP port listens on.
    #[serde(default = "default_host_listen")]
    pub listen: SocketAddr,
}

fn default_host_listen() -> SocketAddr {
    "127.0.0.1:7440".parse().expect("static address")
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            listen: default_host_listen(),
        }
    }
}

/// The `[radio]` section (UDP loopback radio).
#[derive(Debug, Deserialize)]
pub struct RadioSection {
    /// Local address the radio socket binds to.
    #[serde(default = "default_radio_bind")]
    pub bind: SocketAddr,
    /// Peer radio address outbound packets are sent to.
    #[serde(default = "default_radio_peer")]
    pub peer: SocketAddr,
}

fn default_radio_bind() -> SocketAddr {
    "127.0.0.1:7441".parse().expect("static address")
}

fn default_radio_peer() -> SocketAddr {
    "127.0.0.1:7442".parse().expect("static address")
}

impl Default for RadioSection {
    fn default() -> Self {
        Self {
            bind: default_radio_bind(),
            peer: default_radio_peer(),
        }
    }
}
