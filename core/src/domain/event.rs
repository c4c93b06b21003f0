//! Events reported by the core to the application shell.

use serde::Serialize;

/// Something the shell may want to log or display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Event {
    /// A scan finished and replaced the record set.
    ScanCompleted { generation: u64, records: usize },
    /// A scan failed; the record set is now empty and marked with the error.
    ScanFailed { message: String },
    /// A refresh was dropped because another scan was in flight.
    ScanSkipped,
    /// The confirmation prompt was opened for a process.
    TerminationRequested { owner: String },
    /// The confirmation prompt was dismissed.
    TerminationCancelled { owner: String },
    /// SIGKILL was delivered.
    ProcessKilled { pid: u32 },
    /// The kill was rejected or could not be delivered.
    TerminationFailed { owner: String, reason: String },
}
