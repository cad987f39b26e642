//! UDP loopback radio.
//!
//! Carries one on-air packet per datagram, which makes a pair of processes
//! on one machine behave like two radios in range of each other: datagrams
//! can be dropped and reordered, and nothing is retransmitted. Used for
//! bench testing the bridge without hardware.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::UdpSocket;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use loratnc_core::constants::MAX_PACKET_SIZE;

use crate::error::InterfaceError;
use crate::gate::ReceiveGate;
use crate::traits::Radio;

/// Configuration for a [`UdpRadio`].
#[derive(Debug, Clone)]
pub struct UdpRadioConfig {
    /// Human-readable name for this radio.
    pub name: String,
    /// Local address to bind the UDP socket to.
    pub bind_addr: SocketAddr,
    /// Peer address outbound packets are sent to.
    pub peer_addr: SocketAddr,
}

impl UdpRadioConfig {
    pub fn new(name: impl Into<String>, bind_addr: SocketAddr, peer_addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            bind_addr,
            peer_addr,
        }
    }
}

/// A [`Radio`] backed by a UDP socket.
///
/// Inbound datagrams land in a one-slot mailbox guarded by the
/// [`ReceiveGate`]: a datagram arriving mid-transmit is dropped, and a
/// datagram arriving before the previous one was read replaces it (the
/// driver buffer holds one packet). The radio starts disarmed; call
/// [`start_receive`](Radio::start_receive) to begin accepting packets.
pub struct UdpRadio {
    config: UdpRadioConfig,
    socket: Arc<UdpSocket>,
    gate: Arc<ReceiveGate>,
    armed: Arc<AtomicBool>,
    mailbox: Arc<Mutex<Option<Vec<u8>>>>,
    stop_tx: watch::Sender<bool>,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl UdpRadio {
    /// Bind the socket and spawn the receive loop.
    pub async fn bind(config: UdpRadioConfig) -> Result<Self, InterfaceError> {
        let socket = Arc::new(UdpSocket::bind(config.bind_addr).await?);
        info!(
            "{}: bound to {}",
            config.name,
            socket.local_addr().unwrap_or(config.bind_addr)
        );

        let gate = Arc::new(ReceiveGate::new());
        let armed = Arc::new(AtomicBool::new(false));
        let mailbox = Arc::new(Mutex::new(None));
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(Self::read_loop(
            Arc::clone(&socket),
            Arc::clone(&gate),
            Arc::clone(&armed),
            Arc::clone(&mailbox),
            stop_rx,
            config.name.clone(),
        ));

        Ok(Self {
            config,
            socket,
            gate,
            armed,
            mailbox,
            stop_tx,
            task_handle: Mutex::new(Some(handle)),
        })
    }

    /// The locally bound address.
    pub fn local_addr(&self) -> Result<SocketAddr, InterfaceError> {
        Ok(self.socket.local_addr()?)
    }

    /// Stop the receive loop.
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(true);
        if let Some(handle) = self.task_handle.lock().await.take() {
            let _ = handle.await;
        }
    }

    async fn read_loop(
        socket: Arc<UdpSocket>,
        gate: Arc<ReceiveGate>,
        armed: Arc<AtomicBool>,
        mailbox: Arc<Mutex<Option<Vec<u8>>>>,
        mut stop_rx: watch::Receiver<bool>,
        name: String,
    ) {
        let mut buf = vec![0u8; MAX_PACKET_SIZE + 1];

        loop {
            tokio::select! {
                result = socket.recv_from(&mut buf) => {
                    match result {
                        Ok((n, src)) => {
                            if !armed.load(Ordering::SeqCst) {
                                trace!("{}: dropping {} bytes from {} (not armed)", name, n, src);
                                continue;
                            }
                            if gate.is_transmitting() {
                                trace!("{}: dropping {} bytes from {} (mid-transmit)", name, n, src);
                                continue;
                            }
                            debug!("{}: received {} bytes from {}", name, n, src);
                            *mailbox.lock().await = Some(buf[..n.min(MAX_PACKET_SIZE)].to_vec());
                            gate.notify_received();
                        }
                        Err(e) => {
                            warn!("{}: recv error: {}", name, e);
                            if *stop_rx.borrow() {
                                break;
                            }
                        }
                    }
                }
                _ = stop_rx.changed() => {
                    break;
                }
            }
        }
    }
}

impl Radio for UdpRadio {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn gate(&self) -> &ReceiveGate {
        &self.gate
    }

    async fn transmit(&self, data: &[u8]) -> Result<(), InterfaceError> {
        if data.len() > self.mtu() {
            return Err(InterfaceError::PacketTooLarge {
                len: data.len(),
                max: self.mtu(),
            });
        }

        // Transmitting takes the transceiver out of receive mode.
        self.armed.store(false, Ordering::SeqCst);

        let sent = self.socket.send_to(data, self.config.peer_addr).await?;
        if sent != data.len() {
            return Err(InterfaceError::TransmitFailed(format!(
                "sent {} of {} bytes",
                sent,
                data.len()
            )));
        }
        Ok(())
    }

    async fn start_receive(&self) -> Result<(), InterfaceError> {
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn read_packet(&self) -> Result<Option<Vec<u8>>, InterfaceError> {
        Ok(self.mailbox.lock().await.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// One-directional pair: `a` transmits toward `b`.
    async fn bound_pair() -> (UdpRadio, UdpRadio) {
        let b = UdpRadio::bind(UdpRadioConfig::new(
            "radio-b",
            "127.0.0.1:0".parse().unwrap(),
            // b never transmits in these tests; the peer is a placeholder.
            "127.0.0.1:9".parse().unwrap(),
        ))
        .await
        .unwrap();
        let a = UdpRadio::bind(UdpRadioConfig::new(
            "radio-a",
            "127.0.0.1:0".parse().unwrap(),
            b.local_addr().unwrap(),
        ))
        .await
        .unwrap();
        (a, b)
    }

    #[tokio::test]
    async fn packet_roundtrip() {
        let (a, b) = bound_pair().await;
        b.start_receive().await.unwrap();

        a.transmit(&[0x01, 0x02, 0x03]).await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), b.gate().wait())
            .await
            .expect("no receive notification");
        let packet = b.read_packet().await.unwrap();
        assert_eq!(packet, Some(vec![0x01, 0x02, 0x03]));

        a.stop().await;
        b.stop().await;
    }

    #[tokio::test]
    async fn oversized_packet_is_rejected() {
        let (a, b) = bound_pair().await;
        let result = a.transmit(&[0u8; MAX_PACKET_SIZE + 1]).await;
        assert!(matches!(
            result,
            Err(InterfaceError::PacketTooLarge { len: 64, max: 63 })
        ));
        a.stop().await;
        b.stop().await;
    }

    #[tokio::test]
    async fn unarmed_radio_drops_packets() {
        let (a, b) = bound_pair().await;
        // b never calls start_receive.
        a.transmit(&[0xAA; 10]).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!b.gate().take());
        assert_eq!(b.read_packet().await.unwrap(), None);

        a.stop().await;
        b.stop().await;
    }

    #[tokio::test]
    async fn newest_packet_replaces_unread_one() {
        let (a, b) = bound_pair().await;
        b.start_receive().await.unwrap();

        a.transmit(&[0x01; 4]).await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), b.gate().wait())
            .await
            .expect("no notification");
        // Consume the first notification so the next wait blocks until the
        // second packet has actually landed.
        assert!(b.gate().take());

        a.transmit(&[0x02; 4]).await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), b.gate().wait())
            .await
            .expect("no second notification");

        // Only the newest packet is readable.
        assert_eq!(b.read_packet().await.unwrap(), Some(vec![0x02; 4]));
        assert_eq!(b.read_packet().await.unwrap(), None);

        a.stop().await;
        b.stop().await;
    }
}
