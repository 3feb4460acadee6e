use std::path::PathBuf;

use arbor_core::MindNode;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Which view layer the UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Document,
    Settings,
}

/// Named events carrying snapshots for the UI layer to consume.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Latest forest outline, sent after every forest mutation.
    ForestOutline(MindNode),
    /// The settings pseudo-file was selected; no document changes.
    ModeChange(Mode),
    /// A file was re-keyed so other subsystems tracking open files by path
    /// can re-key their own references.
    FileMoved {
        old_path: PathBuf,
        new_path: PathBuf,
    },
}

/// Outbound observer channel. Delivery is fire-and-forget: no
/// acknowledgment, and subscribers that went away are dropped silently.
#[derive(Default)]
pub struct EventBus {
    senders: Vec<UnboundedSender<StoreEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push(tx);
        rx
    }

    pub fn emit(&mut self, event: StoreEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_every_subscriber() {
        let mut bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(StoreEvent::ModeChange(Mode::Settings));

        assert_eq!(rx1.try_recv().unwrap(), StoreEvent::ModeChange(Mode::Settings));
        assert_eq!(rx2.try_recv().unwrap(), StoreEvent::ModeChange(Mode::Settings));
    }

    #[test]
    fn test_closed_subscribers_are_dropped_silently() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        drop(rx);

        bus.emit(StoreEvent::ModeChange(Mode::Settings));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
