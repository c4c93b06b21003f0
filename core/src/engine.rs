//! PortScope Engine - Central state management and auto-refresh.
//!
//! This module provides the main engine that the presentation layer talks
//! to: it reads the latest records, refreshes on demand, keeps the active
//! filter, and runs the two-phase termination flow.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::adapters::{NetstatScanner, NullSink, SignalTerminator};
use crate::application::{
    ConfirmationPrompt, GateState, PollController, PollHandle, RefreshOutcome, Snapshot,
    TerminationGate,
};
use crate::config::Config;
use crate::domain::{filter_records, ConnectionRecord, Event, FilterSpec, RecordSet, ScanOptions};
use crate::error::{KillError, Result};
use crate::ports::{ConnectionScannerPort, EventSink, ProcessTerminatorPort};

/// The main PortScope engine.
///
/// # Usage Pattern
/// Call `start_polling()` and keep the returned handle alive; after the
/// handle is stopped, polling can be started again. Between refreshes,
/// read cached state via `view()` or `snapshot()`.
pub struct PortScopeEngine<S, T> {
    // Components
    controller: Arc<PollController<S>>,
    terminator: T,
    sink: Arc<dyn EventSink>,

    // View state
    filter: RwLock<FilterSpec>,
    gate: Mutex<TerminationGate>,
}

impl PortScopeEngine<NetstatScanner, SignalTerminator> {
    /// Create an engine for this host from configuration.
    pub fn from_config(config: &Config, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;

        let scanner =
            NetstatScanner::with_program(&config.netstat_path).with_timeout(config.scan_timeout());

        let engine = Self::with_sink(scanner, SignalTerminator::new(), config.scan_options(), sink);
        engine.set_filter(config.default_filter());
        Ok(engine)
    }
}

impl<S: ConnectionScannerPort, T: ProcessTerminatorPort> PortScopeEngine<S, T> {
    /// Create an engine that discards events.
    pub fn new(scanner: S, terminator: T, options: ScanOptions) -> Self {
        Self::with_sink(scanner, terminator, options, Arc::new(NullSink))
    }

    /// Create an engine reporting events to the shell's sink.
    pub fn with_sink(
        scanner: S,
        terminator: T,
        options: ScanOptions,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let controller = PollController::new(scanner, options).with_sink(Arc::clone(&sink));
        Self {
            controller: Arc::new(controller),
            terminator,
            sink,
            filter: RwLock::new(FilterSpec::default()),
            gate: Mutex::new(TerminationGate::new()),
        }
    }

    pub fn controller(&self) -> &Arc<PollController<S>> {
        &self.controller
    }

    // MARK: - Record State Access

    /// Perform a single refresh cycle.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.controller.refresh().await
    }

    /// Get the latest snapshot, including any scan error.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.controller.snapshot()
    }

    /// Get all records from the latest scan, ordered.
    pub fn records(&self) -> RecordSet {
        self.controller.records()
    }

    /// Get the latest records with the active filter applied.
    pub fn view(&self) -> Vec<ConnectionRecord> {
        let records = self.controller.records();
        filter_records(&records, &self.filter.read())
    }

    // MARK: - Filter

    pub fn set_filter(&self, filter: FilterSpec) {
        *self.filter.write() = filter;
    }

    pub fn filter(&self) -> FilterSpec {
        self.filter.read().clone()
    }

    // MARK: - Process Termination

    /// First phase: open a confirmation for the process owning a socket.
    pub fn request_termination(&self, owner: &str) -> std::result::Result<ConfirmationPrompt, KillError> {
        match self.gate.lock().request(owner) {
            Ok(prompt) => {
                self.sink.emit(Event::TerminationRequested {
                    owner: owner.to_string(),
                });
                Ok(prompt)
            }
            Err(e) => {
                self.sink.emit(Event::TerminationFailed {
                    owner: owner.to_string(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Second phase: kill the pending target.
    ///
    /// The record set is left alone; the next scan reflects the outcome.
    pub fn confirm_termination(&self) -> std::result::Result<u32, KillError> {
        let mut gate = self.gate.lock();
        let owner = match gate.state() {
            GateState::Confirming(target) => target.owner.clone(),
            GateState::Closed => return Err(KillError::NotConfirmed),
        };

        match gate.confirm(&self.terminator) {
            Ok(pid) => {
                info!(pid = pid, owner = %owner, "Process killed");
                self.sink.emit(Event::ProcessKilled { pid });
                Ok(pid)
            }
            Err(e) => {
                warn!(owner = %owner, error = %e, "Termination failed");
                self.sink.emit(Event::TerminationFailed {
                    owner,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Dismiss the pending confirmation.
    pub fn cancel_termination(&self) {
        if let Some(target) = self.gate.lock().cancel() {
            self.sink.emit(Event::TerminationCancelled {
                owner: target.owner,
            });
        }
    }

    pub fn termination_state(&self) -> GateState {
        self.gate.lock().state().clone()
    }
}

impl<S: ConnectionScannerPort + 'static, T: ProcessTerminatorPort> PortScopeEngine<S, T> {
    /// Start auto-refresh. Polling stops when the handle is stopped or dropped.
    pub fn start_polling(&self, period: Duration) -> PollHandle {
        self.controller.start(period)
    }
}
