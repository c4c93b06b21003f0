//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

pub mod netstat;
pub mod signal;
pub mod sink;

// Re-export main types for convenience
pub use netstat::NetstatScanner;
pub use signal::SignalTerminator;
pub use sink::{ChannelSink, NullSink};
