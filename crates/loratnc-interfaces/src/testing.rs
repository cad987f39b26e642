//! In-memory doubles for the [`Radio`] and [`HostPort`] traits, plus
//! conformance assertions any radio implementation should satisfy.
//!
//! The mocks keep everything deterministic: injected packets pass through
//! the same gate/mailbox path as real inbound packets, and every transmit
//! attempt is recorded whether it succeeds or not.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::error::InterfaceError;
use crate::gate::ReceiveGate;
use crate::traits::{HostPort, Radio};

/// A scriptable in-memory [`Radio`].
pub struct MockRadio {
    name: String,
    gate: ReceiveGate,
    armed: AtomicBool,
    mailbox: Mutex<Option<Vec<u8>>>,
    transmitted: Mutex<Vec<Vec<u8>>>,
    transmit_results: Mutex<VecDeque<Result<(), InterfaceError>>>,
}

impl MockRadio {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gate: ReceiveGate::new(),
            armed: AtomicBool::new(false),
            mailbox: Mutex::new(None),
            transmitted: Mutex::new(Vec::new()),
            transmit_results: Mutex::new(VecDeque::new()),
        }
    }

    /// Deliver an inbound on-air packet, honoring the armed flag and the
    /// gate's drop-if-busy rule. Returns whether the packet was accepted.
    pub async fn inject_packet(&self, packet: &[u8]) -> bool {
        if !self.armed.load(Ordering::SeqCst) || self.gate.is_transmitting() {
            return false;
        }
        *self.mailbox.lock().await = Some(packet.to_vec());
        self.gate.notify_received()
    }

    /// Queue a result for an upcoming transmit; unqueued transmits succeed.
    pub async fn push_transmit_result(&self, result: Result<(), InterfaceError>) {
        self.transmit_results.lock().await.push_back(result);
    }

    /// Every packet handed to [`Radio::transmit`], including failed attempts.
    pub async fn transmitted(&self) -> Vec<Vec<u8>> {
        self.transmitted.lock().await.clone()
    }

    /// Whether the radio is currently armed for receive.
    pub fn is_receiving(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Whether a received packet is waiting in the mailbox (non-destructive,
    /// unlike [`Radio::read_packet`]).
    pub async fn has_packet(&self) -> bool {
        self.mailbox.lock().await.is_some()
    }
}

impl Radio for MockRadio {
    fn name(&self) -> &str {
        &self.name
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
        self.armed.store(false, Ordering::SeqCst);
        self.transmitted.lock().await.push(data.to_vec());
        match self.transmit_results.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(()),
        }
    }

    async fn start_receive(&self) -> Result<(), InterfaceError> {
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn read_packet(&self) -> Result<Option<Vec<u8>>, InterfaceError> {
        Ok(self.mailbox.lock().await.take())
    }
}

/// A scriptable in-memory [`HostPort`].
pub struct MockHostPort {
    name: String,
    incoming_tx: Mutex<Option<tokio::sync::mpsc::Sender<Vec<u8>>>>,
    incoming_rx: Mutex<tokio::sync::mpsc::Receiver<Vec<u8>>>,
    written: Mutex<Vec<u8>>,
    written_notify: Notify,
}

impl MockHostPort {
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, rx) = tokio::sync::mpsc::channel(64);
        Self {
            name: name.into(),
            incoming_tx: Mutex::new(Some(tx)),
            incoming_rx: Mutex::new(rx),
            written: Mutex::new(Vec::new()),
            written_notify: Notify::new(),
        }
    }

    /// Feed bytes that [`HostPort::read_bytes`] will hand to the bridge.
    pub async fn feed(&self, bytes: &[u8]) {
        let guard = self.incoming_tx.lock().await;
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(bytes.to_vec()).await;
        }
    }

    /// Close the host side; subsequent reads report `Stopped` once drained.
    pub async fn close(&self) {
        self.incoming_tx.lock().await.take();
    }

    /// Everything the bridge has written toward the host so far.
    pub async fn written(&self) -> Vec<u8> {
        self.written.lock().await.clone()
    }

    /// Wait until at least `min_len` bytes have been written to the host.
    pub async fn wait_for_written(&self, min_len: usize) -> Vec<u8> {
        loop {
            {
                let written = self.written.lock().await;
                if written.len() >= min_len {
                    return written.clone();
                }
            }
            self.written_notify.notified().await;
        }
    }
}

impl HostPort for MockHostPort {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, InterfaceError> {
        let mut rx = self.incoming_rx.lock().await;
        rx.recv().await.ok_or(InterfaceError::Stopped)
    }

    async fn write_bytes(&self, data: &[u8]) -> Result<(), InterfaceError> {
        self.written.lock().await.extend_from_slice(data);
        self.written_notify.notify_waiters();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Conformance assertions
// ---------------------------------------------------------------------------

/// Assert the radio's MTU leaves room for a header and at least one payload
/// byte.
pub fn assert_mtu_sane(radio: &impl Radio) {
    assert!(
        radio.mtu() > loratnc_core::constants::FRAGMENT_HEADER_SIZE,
        "MTU must exceed the fragment header size"
    );
}

/// Assert that transmitting a packet larger than the MTU fails.
pub async fn assert_oversized_transmit_fails(radio: &impl Radio) {
    let oversized = vec![0u8; radio.mtu() + 1];
    assert!(
        matches!(
            radio.transmit(&oversized).await,
            Err(InterfaceError::PacketTooLarge { .. })
        ),
        "oversized transmit must be rejected"
    );
}

/// Assert that reading with no notification pending yields nothing.
pub async fn assert_spurious_read_is_empty(radio: &impl Radio) {
    let packet = radio
        .read_packet()
        .await
        .expect("spurious read should not error");
    assert!(packet.is_none(), "spurious read must yield no packet");
}
