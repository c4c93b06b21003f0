//! Event sink implementations.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::domain::Event;
use crate::ports::EventSink;

/// Forwards events into a channel owned by the application shell.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end.
    pub fn channel() -> (Self, UnboundedReceiver<Event>) {
        let (tx, rx) = unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: Event) {
        // The shell may have stopped listening; events are best-effort.
        let _ = self.tx.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}
