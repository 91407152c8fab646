/*!
 * Signal Channels
 * Single-slot boolean mailboxes used to wake, restart and abort processes
 *
 * Each channel holds at most one undelivered event. Delivery comes in two
 * flavours:
 * - `deliver`: waits while the slot is occupied, fails only once the
 *   consuming side has gone away
 * - `try_deliver`: never waits, reports an occupied slot or a missing
 *   consumer instead
 */

use tokio::sync::mpsc::{self, error::TrySendError};

/// Capacity of every process signal channel
pub const SIGNAL_CAPACITY: usize = 1;

/// Outcome of a delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The event is now in the slot
    Delivered,
    /// A previous event is still undelivered
    Occupied,
    /// Nothing will ever consume the event
    Closed,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// Create a connected sender/receiver pair with a single slot
pub fn signal_channel() -> (SignalSender, SignalReceiver) {
    let (tx, rx) = mpsc::channel(SIGNAL_CAPACITY);
    (SignalSender { tx }, SignalReceiver { rx })
}

/// Producing side of a signal channel
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::Sender<bool>,
}

impl SignalSender {
    /// Deliver an event, waiting for the slot to drain if necessary
    pub async fn deliver(&self) -> Delivery {
        match self.tx.send(true).await {
            Ok(()) => Delivery::Delivered,
            Err(_) => Delivery::Closed,
        }
    }

    /// Deliver an event only if the slot is free right now
    pub fn try_deliver(&self) -> Delivery {
        match self.tx.try_send(true) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::Occupied,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// Whether the consuming side is still alive
    pub fn has_consumer(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Consuming side of a signal channel
#[derive(Debug)]
pub struct SignalReceiver {
    rx: mpsc::Receiver<bool>,
}

impl SignalReceiver {
    /// Wait for the next event; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<bool> {
        self.rx.recv().await
    }

    /// Take a pending event without waiting
    pub fn try_recv(&mut self) -> Option<bool> {
        self.rx.try_recv().ok()
    }
}
