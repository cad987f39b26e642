//! The bridge event loop: host byte stream on one side, fragmenting packet
//! radio on the other.
//!
//! Data flow, outbound: host bytes feed the KISS decoder; each completed
//! message is split into fragments and sent through the radio strictly in
//! sequence order, fire-and-forget, under the gate's transmit exclusion.
//! Inbound: a receive notification drains the driver mailbox, feeds the
//! reassembler, and a completed message goes back to the host as one KISS
//! frame. No error on either path is fatal; everything returns to the loop.

use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use loratnc_core::KissDecoder;
use loratnc_core::framing::kiss;
use loratnc_interfaces::{HostPort, Radio};
use loratnc_protocol::fragment::fragment_with_limit;
use loratnc_protocol::Reassembler;

/// Handle for requesting a bridge shutdown from another task.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// What the event loop should do next.
enum Event {
    HostBytes(Vec<u8>),
    HostClosed,
    RadioPending,
    Shutdown,
}

/// The bridge orchestrator.
///
/// Generic over the radio and host-port capabilities so the whole loop runs
/// against in-memory doubles in tests.
pub struct Bridge<R: Radio, H: HostPort> {
    radio: R,
    host: H,
    decoder: KissDecoder,
    reassembler: Reassembler,
    max_message: usize,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    messages_sent: u64,
    messages_delivered: u64,
}

impl<R: Radio, H: HostPort> Bridge<R, H> {
    /// Create a bridge over the given endpoints with the given message
    /// ceiling.
    pub fn new(radio: R, host: H, max_message: usize) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            radio,
            host,
            decoder: KissDecoder::with_capacity(max_message),
            reassembler: Reassembler::with_capacity(max_message),
            max_message,
            shutdown_tx,
            shutdown_rx,
            messages_sent: 0,
            messages_delivered: 0,
        }
    }

    /// Handle for stopping the loop from another task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Host messages fragmented and sent over the radio.
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    /// Radio messages reassembled and delivered to the host.
    pub fn messages_delivered(&self) -> u64 {
        self.messages_delivered
    }

    /// Run the event loop until shutdown or host disconnect.
    ///
    /// Cooperative: each iteration waits for host bytes or a receive
    /// notification and handles exactly one of them. An outbound burst runs
    /// to completion before the next event is considered; there is no way
    /// to abort it mid-message.
    pub async fn run(&mut self) {
        info!(
            "bridge up: host {} <-> radio {}",
            self.host.name(),
            self.radio.name()
        );

        if let Err(e) = self.radio.start_receive().await {
            warn!("failed to arm receive: {e}");
        }

        loop {
            let event = tokio::select! {
                _ = self.shutdown_rx.changed() => Event::Shutdown,
                result = self.host.read_bytes() => match result {
                    Ok(bytes) => Event::HostBytes(bytes),
                    Err(_) => Event::HostClosed,
                },
                _ = self.radio.gate().wait() => Event::RadioPending,
            };

            match event {
                Event::Shutdown => {
                    info!("bridge shutting down");
                    break;
                }
                Event::HostClosed => {
                    info!("host stream closed");
                    break;
                }
                Event::HostBytes(bytes) => self.handle_host_bytes(&bytes).await,
                Event::RadioPending => self.handle_radio_pending().await,
            }
        }

        debug!(
            "bridge stats: {} messages sent, {} delivered",
            self.messages_sent, self.messages_delivered
        );
    }

    /// Feed a chunk of host bytes through the decoder, sending every
    /// message it completes.
    pub async fn handle_host_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(message) = self.decoder.push(byte) {
                self.send_message(&message).await;
            }
        }
    }

    /// Consume a pending receive notification, if any, and process the
    /// packet behind it.
    pub async fn handle_radio_pending(&mut self) {
        if !self.radio.gate().take() {
            return;
        }

        let packet = match self.radio.read_packet().await {
            Ok(Some(packet)) => packet,
            // A spurious notification; nothing to read.
            Ok(None) => return,
            Err(e) => {
                warn!("radio read failed: {e}");
                return;
            }
        };

        trace!("inbound packet of {} bytes", packet.len());
        if let Some(message) = self.reassembler.accept(&packet) {
            self.messages_delivered += 1;
            debug!("delivering {}-byte message to host", message.len());
            if let Err(e) = self.host.write_bytes(&kiss::frame(&message)).await {
                warn!("host write failed: {e}");
            }
        }

        // Re-arm after any receive processing.
        if let Err(e) = self.radio.start_receive().await {
            warn!("failed to re-arm receive: {e}");
        }
    }

    /// Fragment one outbound message and transmit the burst.
    ///
    /// Fire-and-forget: a failed fragment is logged and the burst continues;
    /// there is no retry and no abort. The gate's transmit exclusion covers
    /// the whole burst, and the radio is re-armed for receive afterwards.
    async fn send_message(&mut self, message: &[u8]) {
        let packets = match fragment_with_limit(message, self.max_message) {
            Ok(packets) => packets,
            Err(e) => {
                warn!("dropping outbound message: {e}");
                return;
            }
        };

        let total = packets.len();
        self.radio.gate().begin_transmit();
        let mut failures = 0usize;
        for (index, packet) in packets.iter().enumerate() {
            match self.radio.transmit(packet).await {
                Ok(()) => trace!("sent fragment {}/{}", index + 1, total),
                Err(e) => {
                    failures += 1;
                    warn!("fragment {}/{} failed: {e}", index + 1, total);
                }
            }
        }
        self.radio.gate().end_transmit();

        if let Err(e) = self.radio.start_receive().await {
            warn!("failed to re-arm receive: {e}");
        }

        self.messages_sent += 1;
        debug!(
            "sent {}-byte message in {} fragments ({} failed)",
            message.len(),
            total,
            failures
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loratnc_core::constants::MAX_PAYLOAD_SIZE;
    use loratnc_interfaces::testing::{MockHostPort, MockRadio};

    fn bridge() -> Bridge<MockRadio, MockHostPort> {
        Bridge::new(
            MockRadio::new("mock-radio"),
            MockHostPort::new("mock-host"),
            loratnc_core::constants::MAX_MESSAGE_SIZE,
        )
    }

    #[tokio::test]
    async fn host_frame_becomes_fragments() {
        let mut bridge = bridge();
        let message = vec![0x5A; MAX_PAYLOAD_SIZE + 10];

        bridge.handle_host_bytes(&kiss::frame(&message)).await;

        let sent = bridge.radio().transmitted().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0][..3], [0, 2, MAX_PAYLOAD_SIZE as u8]);
        assert_eq!(sent[1][..3], [1, 2, 10]);
        assert_eq!(bridge.messages_sent(), 1);
        // Radio re-armed after the burst.
        assert!(bridge.radio().is_receiving());
    }

    #[tokio::test]
    async fn failed_fragment_does_not_stop_the_burst() {
        let mut bridge = bridge();
        bridge
            .radio()
            .push_transmit_result(Err(
                loratnc_interfaces::InterfaceError::TransmitFailed("scripted".into()),
            ))
            .await;

        let message = vec![0x11; 3 * MAX_PAYLOAD_SIZE];
        bridge.handle_host_bytes(&kiss::frame(&message)).await;

        // All three fragments were attempted despite the first failing.
        assert_eq!(bridge.radio().transmitted().await.len(), 3);
        assert_eq!(bridge.messages_sent(), 1);
    }

    #[tokio::test]
    async fn inbound_fragments_reach_the_host_as_one_frame() {
        let mut bridge = bridge();
        bridge.radio().start_receive().await.unwrap();

        let message: Vec<u8> = (0..150u8).collect();
        let packets = loratnc_protocol::fragment(&message).unwrap();

        // Deliver out of order: [2, 0, 1].
        for index in [2usize, 0, 1] {
            assert!(bridge.radio().inject_packet(&packets[index]).await);
            bridge.handle_radio_pending().await;
        }

        assert_eq!(bridge.host().written().await, kiss::frame(&message));
        assert_eq!(bridge.messages_delivered(), 1);
    }

    #[tokio::test]
    async fn incomplete_message_never_reaches_the_host() {
        let mut bridge = bridge();
        bridge.radio().start_receive().await.unwrap();

        let packets = loratnc_protocol::fragment(&vec![0x42; 200]).unwrap();
        for packet in &packets[..packets.len() - 1] {
            assert!(bridge.radio().inject_packet(packet).await);
            bridge.handle_radio_pending().await;
        }

        assert!(bridge.host().written().await.is_empty());
        assert_eq!(bridge.messages_delivered(), 0);
    }

    #[tokio::test]
    async fn spurious_notification_is_a_no_op() {
        let mut bridge = bridge();
        bridge.radio().start_receive().await.unwrap();

        bridge.radio().gate().notify_received();
        bridge.handle_radio_pending().await;

        assert!(bridge.host().written().await.is_empty());
    }

    #[tokio::test]
    async fn empty_host_frame_sends_nothing() {
        let mut bridge = bridge();
        bridge
            .handle_host_bytes(&[kiss::FEND, kiss::CMD_DATA, kiss::FEND])
            .await;
        assert!(bridge.radio().transmitted().await.is_empty());
        assert_eq!(bridge.messages_sent(), 0);
    }
}
