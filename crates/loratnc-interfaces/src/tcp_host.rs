//! TCP-served host byte stream.
//!
//! The host side of the bridge is a plain duplex byte stream; serving it
//! over TCP lets any terminal program or script talk KISS to the bridge.
//! One connection at a time: the port binds, accepts a single peer, and is
//! done when that peer disconnects.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::error::InterfaceError;
use crate::traits::HostPort;

/// Size of the read buffer for host-stream chunks.
const READ_CHUNK: usize = 1024;

/// Configuration for a [`TcpHostPort`].
#[derive(Debug, Clone)]
pub struct TcpHostConfig {
    /// Human-readable name for this port.
    pub name: String,
    /// Address to listen on.
    pub listen_addr: SocketAddr,
}

impl TcpHostConfig {
    pub fn new(name: impl Into<String>, listen_addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            listen_addr,
        }
    }
}

/// A [`HostPort`] backed by a single accepted TCP connection.
pub struct TcpHostPort {
    name: String,
    rx: Mutex<mpsc::Receiver<Vec<u8>>>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpHostPort {
    /// Bind the listen address and wait for the host to connect.
    pub async fn accept(config: TcpHostConfig) -> Result<Self, InterfaceError> {
        let listener = TcpListener::bind(config.listen_addr).await?;
        info!(
            "{}: listening on {}",
            config.name,
            listener.local_addr().unwrap_or(config.listen_addr)
        );

        let (stream, peer) = listener.accept().await?;
        info!("{}: host connected from {}", config.name, peer);
        Ok(Self::from_stream(config.name, stream))
    }

    /// Wrap an already-connected stream (used by tests).
    pub fn from_stream(name: String, stream: TcpStream) -> Self {
        let (mut read_half, writer) = stream.into_split();
        let (tx, rx) = mpsc::channel(64);

        let task_name = name.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; READ_CHUNK];
            loop {
                match read_half.read(&mut buf).await {
                    Ok(0) => {
                        debug!("{}: host disconnected", task_name);
                        break;
                    }
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!("{}: read error: {}", task_name, e);
                        break;
                    }
                }
            }
        });

        Self {
            name,
            rx: Mutex::new(rx),
            writer: Mutex::new(writer),
        }
    }
}

impl HostPort for TcpHostPort {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, InterfaceError> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or(InterfaceError::Stopped)
    }

    async fn write_bytes(&self, data: &[u8]) -> Result<(), InterfaceError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(data).await?;
        writer.flush().await?;
        Ok(())
    }
}
