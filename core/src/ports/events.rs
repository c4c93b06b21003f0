//! Event sink port (interface).

use crate::domain::Event;

/// Port for reporting events to the application shell.
///
/// The shell owns the sink and hands it to the core; the core never
/// listens for messages on its own.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}
