//! PortScope Core Library
//!
//! Lists the host's network connections and the processes that own them,
//! and kills an owning process after an explicit confirmation.
//! Provides functionality to:
//! - Run `netstat -ptu` and parse its table into connection records
//! - Order records (owned sockets first) and filter them by one column
//! - Kill an owning process by PID with SIGKILL, in two phases
//! - Re-scan periodically without overlapping scans
//! - Manage user configuration (interval, scan flags, default column)
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Linux: Uses the net-tools `netstat` command
//! - Other Unix: Scans work wherever a compatible `netstat -ptu` exists
//! - Windows: Termination is unsupported

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod engine;
pub mod error;

#[cfg(test)]
mod testing;

// Re-export domain types (primary API)
pub use domain::{
    filter_records, order_records, parse, ConnectionRecord, Event, Field, FilterSpec, RawOutput,
    RecordSet, ScanFlag, ScanOptions, NO_OWNER,
};

// Re-export other commonly used types
pub use adapters::{ChannelSink, NetstatScanner, NullSink, SignalTerminator};
pub use application::{
    ConfirmationPrompt, GateState, PollHandle, RefreshOutcome, Snapshot, TerminationTarget,
    DEFAULT_PERIOD, TERMINATION_WARNING,
};
pub use config::{Config, ConfigStore};
pub use engine::PortScopeEngine;
pub use error::{Error, KillError, ParseError, Result, ScanError};
