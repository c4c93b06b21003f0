//! Error types for the portscope-core library.

use thiserror::Error;

/// Result type alias for portscope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring the raw connection table.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The connection-listing utility is not installed or not on `PATH`.
    #[error("Connection-listing utility not found: {0}")]
    UtilityNotFound(String),

    /// The utility could not be spawned or could not resolve owners.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The utility ran but reported failure.
    #[error("Scan command exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// An extra argument was not in the allow-list.
    #[error("Argument not allowed: {0}")]
    DisallowedArgument(String),

    /// The utility produced output that is not valid UTF-8.
    #[error("Invalid scan output: {0}")]
    InvalidOutput(String),

    /// The utility did not finish within the configured timeout.
    #[error("Scan timed out after {0} ms")]
    TimedOut(u64),

    /// Any other I/O error while running the utility.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a single line of scan output is rejected.
///
/// Never surfaced to consumers: the parser logs and skips the line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 7 fields, found {found}: {line:?}")]
    Arity { found: usize, line: String },

    #[error("queue column is not numeric: {0:?}")]
    NonNumericQueue(String),
}

/// Errors that can occur while terminating a process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KillError {
    /// The socket has no owning process (`-`).
    #[error("Socket has no owning process")]
    NoOwningProcess,

    /// The owner token does not start with a usable process id.
    #[error("Invalid process identifier: {0:?}")]
    InvalidIdentifier(String),

    /// `confirm` was called without a pending confirmation.
    #[error("Termination was not confirmed")]
    NotConfirmed,

    /// The process no longer exists.
    #[error("Process with PID {0} not found")]
    ProcessNotFound(u32),

    /// Insufficient privilege to signal the process.
    #[error("Permission denied to kill process {0}")]
    PermissionDenied(u32),

    /// The signal could not be delivered for another reason.
    #[error("Failed to kill process {pid}: {reason}")]
    SignalFailed { pid: u32, reason: String },

    /// Signals are not available on this platform.
    #[error("Process termination is not supported on this platform")]
    Unsupported,
}

/// Errors that can occur in portscope operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to scan the connection table.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Failed to terminate a process.
    #[error(transparent)]
    Kill(#[from] KillError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
