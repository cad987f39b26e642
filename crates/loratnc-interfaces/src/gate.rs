//! Receive-notification gate between the driver context and the poll loop.
//!
//! The radio driver signals "packet received" from its own context; no
//! decoding happens there. The gate carries that signal to the polling loop
//! as an at-most-one-pending notification: signals coalesce, and a signal
//! raised while a transmission is in flight is dropped outright, losing the
//! packet. The transceiver is half-duplex and has no receive queue, so
//! drop-if-busy is the rule rather than an accident.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Single-producer/single-consumer receive signal with transmit exclusion.
#[derive(Debug, Default)]
pub struct ReceiveGate {
    pending: AtomicBool,
    transmitting: AtomicBool,
    notify: Notify,
}

impl ReceiveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver side: raise the receive notification.
    ///
    /// Returns `false` when the notification was dropped because a
    /// transmission is in flight. A notification raised while one is
    /// already pending coalesces into it.
    pub fn notify_received(&self) -> bool {
        if self.transmitting.load(Ordering::SeqCst) {
            return false;
        }
        self.pending.store(true, Ordering::SeqCst);
        self.notify.notify_one();
        true
    }

    /// Poll side: consume the pending notification, if any.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    /// Poll side: wait until a notification is pending. Does not consume
    /// it — callers follow up with [`take`](Self::take), so a wait that is
    /// raced out (e.g. an unchosen `select!` branch) loses nothing.
    pub async fn wait(&self) {
        loop {
            if self.pending.load(Ordering::SeqCst) {
                return;
            }
            self.notify.notified().await;
        }
    }

    /// Assert transmit exclusion for the duration of an outbound burst.
    /// Notifications raised in between are dropped at [`notify_received`](Self::notify_received).
    pub fn begin_transmit(&self) {
        self.transmitting.store(true, Ordering::SeqCst);
    }

    /// Release transmit exclusion. Any notification dropped during the
    /// burst stays dropped.
    pub fn end_transmit(&self) {
        self.transmitting.store(false, Ordering::SeqCst);
    }

    pub fn is_transmitting(&self) -> bool {
        self.transmitting.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_is_consumed_once() {
        let gate = ReceiveGate::new();
        assert!(!gate.take());
        assert!(gate.notify_received());
        assert!(gate.take());
        assert!(!gate.take());
    }

    #[test]
    fn notifications_coalesce() {
        let gate = ReceiveGate::new();
        assert!(gate.notify_received());
        assert!(gate.notify_received());
        assert!(gate.take());
        assert!(!gate.take());
    }

    #[test]
    fn dropped_while_transmitting() {
        let gate = ReceiveGate::new();
        gate.begin_transmit();
        assert!(!gate.notify_received());
        gate.end_transmit();
        // The dropped notification does not reappear.
        assert!(!gate.take());
    }

    #[test]
    fn pending_before_transmit_survives_the_burst() {
        let gate = ReceiveGate::new();
        assert!(gate.notify_received());
        gate.begin_transmit();
        gate.end_transmit();
        assert!(gate.take());
    }

    #[tokio::test]
    async fn wait_returns_for_a_prior_notification() {
        let gate = ReceiveGate::new();
        gate.notify_received();
        gate.wait().await;
        // wait() leaves the notification for take().
        assert!(gate.take());
        assert!(!gate.take());
    }

    #[tokio::test]
    async fn wait_wakes_on_notification() {
        let gate = std::sync::Arc::new(ReceiveGate::new());
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait().await })
        };
        // Give the waiter a chance to park first.
        tokio::task::yield_now().await;
        gate.notify_received();
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("waiter timed out")
            .unwrap();
    }
}
