//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::domain::{RawOutput, ScanOptions};
use crate::error::{KillError, ScanError};
use crate::ports::{ConnectionScannerPort, ProcessTerminatorPort};

/// Typical `netstat -ptu` output: one unowned row ahead of two owned rows.
pub const SAMPLE_OUTPUT: &str = "\
Active Internet connections (w/o servers)
Proto Recv-Q Send-Q Local Address           Foreign Address         State       PID/Program name
tcp        0      0 0.0.0.0:111             0.0.0.0:*               LISTEN      -
tcp        0      0 127.0.0.1:80            0.0.0.0:*               LISTEN      1234/nginx
udp        0      0 0.0.0.0:68              0.0.0.0:*                           812/dhclient
";

/// Scanner returning queued results, then `SAMPLE_OUTPUT`.
pub struct MockScanner {
    results: Mutex<VecDeque<Result<RawOutput, ScanError>>>,
    calls: Arc<AtomicUsize>,
    gate: Option<Arc<Notify>>,
}

impl MockScanner {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let scanner = Self {
            results: Mutex::new(VecDeque::new()),
            calls: Arc::clone(&calls),
            gate: None,
        };
        (scanner, calls)
    }

    /// A scanner whose scans block until the gate is notified.
    pub fn gated(gate: Arc<Notify>) -> (Self, Arc<AtomicUsize>) {
        let (mut scanner, calls) = Self::new();
        scanner.gate = Some(gate);
        (scanner, calls)
    }

    pub fn then(self, result: Result<RawOutput, ScanError>) -> Self {
        self.results.lock().push_back(result);
        self
    }
}

impl ConnectionScannerPort for MockScanner {
    async fn scan(&self, _options: &ScanOptions) -> Result<RawOutput, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.results.lock().pop_front();
        next.unwrap_or_else(|| Ok(RawOutput::new(SAMPLE_OUTPUT)))
    }
}

/// Terminator recording every PID it was asked to kill.
#[derive(Default)]
pub struct MockTerminator {
    pub killed: Arc<Mutex<Vec<u32>>>,
    pub failure: Option<KillError>,
}

impl MockTerminator {
    pub fn failing(error: KillError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }
}

impl ProcessTerminatorPort for MockTerminator {
    fn kill(&self, pid: u32) -> Result<(), KillError> {
        self.killed.lock().push(pid);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
