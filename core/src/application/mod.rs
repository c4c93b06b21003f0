//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod poll_controller;
mod termination;

pub use poll_controller::{PollController, PollHandle, RefreshOutcome, Snapshot, DEFAULT_PERIOD};
pub use termination::{
    ConfirmationPrompt, GateState, TerminationGate, TerminationTarget, TERMINATION_WARNING,
};
