//! Two-phase termination gate.
//!
//! Killing a process takes two distinct actions: [`TerminationGate::request`]
//! opens a confirmation for one target, and only [`TerminationGate::confirm`]
//! reaches the terminator. The gate knows nothing about records or polling.

use serde::Serialize;

use crate::domain::program_name;
use crate::error::KillError;
use crate::ports::{resolve_pid, ProcessTerminatorPort};

/// Warning shown with every confirmation prompt.
pub const TERMINATION_WARNING: &str = "Killing a process is irreversible: it receives SIGKILL \
     without a chance to clean up, and the host may become unstable.";

/// The process a confirmation is pending for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationTarget {
    /// Owner token as shown in the connection table.
    pub owner: String,
    pub pid: u32,
    pub program: Option<String>,
}

impl std::fmt::Display for TerminationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.program {
            Some(program) => write!(f, "{} (PID {})", program, self.pid),
            None => write!(f, "PID {}", self.pid),
        }
    }
}

/// What the operator must acknowledge before the kill is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationPrompt {
    pub target: TerminationTarget,
    pub warning: &'static str,
}

/// State of the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Closed,
    Confirming(TerminationTarget),
}

/// Confirm-before-act state machine.
///
/// ```text
/// request() : Closed     -> Confirming
/// confirm() : Confirming -> (terminate) -> Closed
/// cancel()  : Confirming -> Closed
/// ```
#[derive(Debug, Default)]
pub struct TerminationGate {
    state: GateState,
}

impl TerminationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self.state, GateState::Confirming(_))
    }

    /// Open a confirmation for the process owning a socket.
    ///
    /// Unowned sockets (`-`) and tokens without a PID are rejected and leave
    /// the state unchanged. A request while confirming replaces the target.
    pub fn request(&mut self, owner: &str) -> Result<ConfirmationPrompt, KillError> {
        let pid = resolve_pid(owner)?;
        let target = TerminationTarget {
            owner: owner.to_string(),
            pid,
            program: program_name(owner).map(str::to_string),
        };
        self.state = GateState::Confirming(target.clone());
        Ok(ConfirmationPrompt {
            target,
            warning: TERMINATION_WARNING,
        })
    }

    /// Kill the pending target and close the gate.
    ///
    /// Returns the PID that was signalled. The gate closes even if the kill fails.
    pub fn confirm<T>(&mut self, terminator: &T) -> Result<u32, KillError>
    where
        T: ProcessTerminatorPort + ?Sized,
    {
        match std::mem::take(&mut self.state) {
            GateState::Confirming(target) => terminator.terminate(&target.owner),
            GateState::Closed => Err(KillError::NotConfirmed),
        }
    }

    /// Dismiss the pending confirmation, if any.
    pub fn cancel(&mut self) -> Option<TerminationTarget> {
        match std::mem::take(&mut self.state) {
            GateState::Confirming(target) => Some(target),
            GateState::Closed => None,
        }
    }
}
