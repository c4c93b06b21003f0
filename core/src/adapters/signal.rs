//! Process terminator implementation using SIGKILL.

use tracing::{debug, info, warn};

use crate::error::KillError;
use crate::ports::ProcessTerminatorPort;

/// Sends SIGKILL through `kill(2)`.
///
/// Only the unconditional kill is used: the target gets no chance to
/// clean up, and the call returns as soon as the signal is queued.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalTerminator;

impl SignalTerminator {
    pub fn new() -> Self {
        Self
    }

    /// Check if a process is running (signal-0 probe).
    #[cfg(unix)]
    pub fn is_running(&self, pid: u32) -> bool {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        match to_raw_pid(pid) {
            Ok(raw) => kill(Pid::from_raw(raw), None).is_ok(),
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    pub fn is_running(&self, _pid: u32) -> bool {
        false
    }
}

/// PIDs outside `1..=i32::MAX` would address process groups or wrap.
#[cfg_attr(not(unix), allow(dead_code))]
fn to_raw_pid(pid: u32) -> Result<i32, KillError> {
    i32::try_from(pid)
        .ok()
        .filter(|raw| *raw > 0)
        .ok_or_else(|| KillError::InvalidIdentifier(pid.to_string()))
}

impl ProcessTerminatorPort for SignalTerminator {
    #[cfg(unix)]
    fn kill(&self, pid: u32) -> Result<(), KillError> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let raw = to_raw_pid(pid)?;
        debug!(pid = pid, "Sending SIGKILL");

        match kill(Pid::from_raw(raw), Signal::SIGKILL) {
            Ok(()) => {
                info!(pid = pid, "SIGKILL sent");
                Ok(())
            }
            Err(Errno::ESRCH) => {
                debug!(pid = pid, "Process not found");
                Err(KillError::ProcessNotFound(pid))
            }
            Err(Errno::EPERM) => {
                warn!(pid = pid, "Permission denied to kill process");
                Err(KillError::PermissionDenied(pid))
            }
            Err(errno) => {
                warn!(pid = pid, error = %errno, "Failed to send SIGKILL");
                Err(KillError::SignalFailed {
                    pid,
                    reason: errno.desc().to_string(),
                })
            }
        }
    }

    #[cfg(not(unix))]
    fn kill(&self, _pid: u32) -> Result<(), KillError> {
        Err(KillError::Unsupported)
    }
}
