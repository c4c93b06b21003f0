//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`.

mod events;
mod scanner;
mod terminator;

pub use events::EventSink;
pub use scanner::ConnectionScannerPort;
pub use terminator::{resolve_pid, ProcessTerminatorPort};
