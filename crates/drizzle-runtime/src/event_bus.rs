//! Event bus for inbound overlay notifications
//!
//! Any thread may hold an `EventSender`. The frame loop drains the bus once
//! per frame and applies the events synchronously.

use crate::event::OverlayEvent;
use crossbeam::channel::{unbounded, Receiver, Sender};

/// Clonable handle for queueing events from any thread
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<OverlayEvent>,
}

impl EventSender {
    /// Queue an event. Returns false if the bus has been dropped.
    pub fn send(&self, event: OverlayEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Multi-producer queue that the frame loop drains
pub struct EventBus {
    tx: Sender<OverlayEvent>,
    rx: Receiver<OverlayEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Push an event onto the bus
    pub fn push(&self, event: OverlayEvent) {
        // The bus owns a receiver, so the channel cannot be disconnected here
        let _ = self.tx.send(event);
    }

    /// Drain all pending events, oldest first
    pub fn drain(&self) -> Vec<OverlayEvent> {
        self.rx.try_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.rx.len()
    }
}
