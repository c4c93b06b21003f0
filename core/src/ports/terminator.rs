//! Process terminator port (interface).

use crate::domain::{is_owned, owner_pid};
use crate::error::KillError;

/// Port for killing processes.
///
/// Implementations send an unconditional kill and return without waiting
/// for the target to exit.
pub trait ProcessTerminatorPort: Send + Sync {
    /// Send SIGKILL to a process by PID.
    fn kill(&self, pid: u32) -> Result<(), KillError>;

    /// Kill the process named by a `pid/program` owner token.
    ///
    /// The `-` sentinel and tokens without a leading PID are rejected
    /// before any signal is sent.
    fn terminate(&self, owner: &str) -> Result<u32, KillError> {
        let pid = resolve_pid(owner)?;
        self.kill(pid)?;
        Ok(pid)
    }
}

/// Extract a signalable PID from an owner token.
pub fn resolve_pid(owner: &str) -> Result<u32, KillError> {
    if !is_owned(owner) {
        return Err(KillError::NoOwningProcess);
    }
    match owner_pid(owner) {
        Some(pid) if pid > 0 => Ok(pid),
        _ => Err(KillError::InvalidIdentifier(owner.to_string())),
    }
}
