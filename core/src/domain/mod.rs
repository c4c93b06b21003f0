//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod event;
mod filter;
pub mod parser;
mod record;
mod scan;

// Re-export all domain types
pub use event::Event;
pub use filter::{filter_records, order_records, FilterSpec};
pub use parser::{parse, RawOutput};
pub use record::{
    is_owned, owner_pid, program_name, ConnectionRecord, Field, RecordSet, NO_OWNER,
};
pub use scan::{ScanFlag, ScanOptions};
