//! Periodic scanning with single-flight refreshes.
//!
//! The controller owns the current [`RecordSet`]. Each refresh runs
//! Scanner → Parser → Orderer and swaps the published [`Snapshot`] in one
//! step, so readers holding the previous snapshot never see a partial update.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::adapters::NullSink;
use crate::domain::{order_records, parse, Event, RecordSet, ScanOptions};
use crate::ports::{ConnectionScannerPort, EventSink};

/// Default period between scans.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(3);

/// Shortest period accepted by [`PollController::start`].
const MIN_PERIOD: Duration = Duration::from_millis(100);

/// State published after each scan.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Records from the latest scan; empty if it failed.
    pub records: RecordSet,
    /// Records from the latest successful scan.
    pub last_good: RecordSet,
    /// Error from the latest scan, if it failed.
    pub error: Option<String>,
    /// Number of successful scans so far.
    pub generation: u64,
    /// When the latest scan finished.
    pub scanned_at: Option<DateTime<Local>>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            records: Vec::new().into(),
            last_good: Vec::new().into(),
            error: None,
            generation: 0,
            scanned_at: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of a single refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The scan succeeded and replaced the record set.
    Completed { records: usize },
    /// The scan failed; the snapshot now carries the error.
    Failed,
    /// Another scan was in flight; this one was dropped.
    Skipped,
    /// The controller was stopped before the scan started.
    Stopped,
    /// The controller was stopped while the scan ran; its result was dropped.
    Discarded,
}

/// Clears the in-flight flag however the scan ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives scans and owns the current snapshot.
pub struct PollController<S> {
    scanner: S,
    options: ScanOptions,
    sink: Arc<dyn EventSink>,
    snapshot: RwLock<Arc<Snapshot>>,
    in_flight: AtomicBool,
    stopped: AtomicBool,
}

impl<S: ConnectionScannerPort> PollController<S> {
    /// Create a controller that scans with the given flags.
    pub fn new(scanner: S, options: ScanOptions) -> Self {
        Self {
            scanner,
            options,
            sink: Arc::new(NullSink),
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            in_flight: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Report events to the given sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Records from the latest scan.
    pub fn records(&self) -> RecordSet {
        Arc::clone(&self.snapshot.read().records)
    }

    /// Check if a scan is running.
    pub fn is_scanning(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Stop accepting scans for good. A scan already running finishes but its
    /// result is dropped.
    ///
    /// Poll loops have their own stop handle; stopping one leaves the
    /// controller usable.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Perform a single scan cycle, unless one is already running.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.refresh_until(None).await
    }

    fn cancelled(&self, token: Option<&AtomicBool>) -> bool {
        self.is_stopped() || token.is_some_and(|t| t.load(Ordering::SeqCst))
    }

    /// Scan cycle that is also abandoned once `token` is set.
    async fn refresh_until(&self, token: Option<&AtomicBool>) -> RefreshOutcome {
        if self.cancelled(token) {
            return RefreshOutcome::Stopped;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Scan already in flight, dropping refresh");
            self.sink.emit(Event::ScanSkipped);
            return RefreshOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let result = self.scanner.scan(&self.options).await;

        if self.cancelled(token) {
            debug!("Stopped during scan, discarding result");
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(raw) => {
                let records: RecordSet = order_records(parse(&raw)).into();
                let count = records.len();
                let generation = self.publish(|previous| Snapshot {
                    records: Arc::clone(&records),
                    last_good: Arc::clone(&records),
                    error: None,
                    generation: previous.generation + 1,
                    scanned_at: Some(Local::now()),
                });
                debug!(generation = generation, records = count, "Scan completed");
                self.sink.emit(Event::ScanCompleted {
                    generation,
                    records: count,
                });
                RefreshOutcome::Completed { records: count }
            }
            Err(e) => {
                warn!(error = %e, "Scan failed");
                let message = e.to_string();
                self.publish(|previous| Snapshot {
                    records: Vec::new().into(),
                    last_good: Arc::clone(&previous.last_good),
                    error: Some(message.clone()),
                    generation: previous.generation,
                    scanned_at: Some(Local::now()),
                });
                self.sink.emit(Event::ScanFailed { message });
                RefreshOutcome::Failed
            }
        }
    }

    /// Swap in a new snapshot built from the current one.
    fn publish(&self, build: impl FnOnce(&Snapshot) -> Snapshot) -> u64 {
        let mut slot = self.snapshot.write();
        let next = build(&slot);
        let generation = next.generation;
        *slot = Arc::new(next);
        generation
    }
}

impl<S: ConnectionScannerPort + 'static> PollController<S> {
    /// Start the periodic scan loop.
    ///
    /// The first scan runs immediately. Ticks that come due while a scan
    /// is running are skipped, not queued.
    pub fn start(self: &Arc<Self>, period: Duration) -> PollHandle {
        let period = period.max(MIN_PERIOD);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let controller = Arc::clone(self);
        let cancelled = Arc::new(AtomicBool::new(false));
        let token = Arc::clone(&cancelled);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        controller.refresh_until(Some(&token)).await;
                    }
                }
            }
            debug!("Poll loop stopped");
        });

        PollHandle {
            stop_tx,
            cancelled,
            task: Some(task),
        }
    }
}

/// Stop handle for a running poll loop. Dropping it stops the loop.
///
/// Each call to [`PollController::start`] gets its own handle; the
/// controller can be started again after a handle is stopped.
pub struct PollHandle {
    stop_tx: watch::Sender<bool>,
    cancelled: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Cancel the timer. The loop starts no scan after this returns.
    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.stop_tx.send(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Stop and wait for the loop to exit, letting an in-flight scan finish.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ChannelSink;
    use crate::domain::RawOutput;
    use crate::error::ScanError;
    use crate::testing::MockScanner;
    use tokio::sync::Notify;
    use tokio_test::{assert_pending, assert_ready_eq};

    #[tokio::test]
    async fn test_refresh_publishes_ordered_records() {
        let (scanner, _calls) = MockScanner::new();
        let (sink, mut events) = ChannelSink::channel();
        let controller = PollController::new(scanner, ScanOptions::default()).with_sink(Arc::new(sink));

        assert!(controller.records().is_empty());
        assert_eq!(controller.snapshot().generation, 0);

        let outcome = controller.refresh().await;
        assert_eq!(outcome, RefreshOutcome::Completed { records: 3 });

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.generation, 1);
        assert!(!snapshot.is_error());
        let owners: Vec<&str> = snapshot.records.iter().map(|r| r.owner()).collect();
        assert_eq!(owners, ["1234/nginx", "812/dhclient", "-"]);

        assert_eq!(
            events.try_recv().unwrap(),
            Event::ScanCompleted {
                generation: 1,
                records: 3
            }
        );
    }

    #[tokio::test]
    async fn test_failure_marks_error_and_keeps_last_good() {
        let (scanner, _calls) = MockScanner::new();
        let scanner = scanner
            .then(Ok(RawOutput::new(crate::testing::SAMPLE_OUTPUT)))
            .then(Err(ScanError::UtilityNotFound("netstat".to_string())));
        let controller = PollController::new(scanner, ScanOptions::default());

        controller.refresh().await;
        let before = controller.snapshot();

        assert_eq!(controller.refresh().await, RefreshOutcome::Failed);
        let after = controller.snapshot();
        assert!(after.records.is_empty());
        assert!(after.error.as_deref().unwrap().contains("netstat"));
        assert_eq!(after.last_good, before.records);
        assert_eq!(after.generation, 1);

        // Earlier readers still hold the old set
        assert_eq!(before.records.len(), 3);

        // Next successful scan clears the error
        assert_eq!(
            controller.refresh().await,
            RefreshOutcome::Completed { records: 3 }
        );
        assert!(!controller.snapshot().is_error());
    }

    #[test]
    fn test_overlapping_refresh_is_skipped() {
        let gate = Arc::new(Notify::new());
        let (scanner, calls) = MockScanner::gated(Arc::clone(&gate));
        let controller = PollController::new(scanner, ScanOptions::default());

        let mut first = tokio_test::task::spawn(controller.refresh());
        assert_pending!(first.poll());
        assert!(controller.is_scanning());

        let mut second = tokio_test::task::spawn(controller.refresh());
        assert_ready_eq!(second.poll(), RefreshOutcome::Skipped);

        gate.notify_one();
        assert_ready_eq!(first.poll(), RefreshOutcome::Completed { records: 3 });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!controller.is_scanning());
    }

    #[test]
    fn test_stop_discards_in_flight_result() {
        let gate = Arc::new(Notify::new());
        let (scanner, _calls) = MockScanner::gated(Arc::clone(&gate));
        let controller = PollController::new(scanner, ScanOptions::default());

        let mut scan = tokio_test::task::spawn(controller.refresh());
        assert_pending!(scan.poll());

        controller.stop();
        gate.notify_one();
        assert_ready_eq!(scan.poll(), RefreshOutcome::Discarded);
        assert_eq!(controller.snapshot().generation, 0);
        assert!(controller.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_loop_scans_immediately_then_periodically() {
        let (scanner, calls) = MockScanner::new();
        let controller = Arc::new(PollController::new(scanner, ScanOptions::default()));
        let handle = controller.start(DEFAULT_PERIOD);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.snapshot().generation, 1);

        tokio::time::sleep(DEFAULT_PERIOD).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        handle.shutdown().await;
        tokio::time::sleep(DEFAULT_PERIOD * 10).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_shutdown() {
        let (scanner, calls) = MockScanner::new();
        let controller = Arc::new(PollController::new(scanner, ScanOptions::default()));

        controller.start(DEFAULT_PERIOD).shutdown().await;
        tokio::time::sleep(DEFAULT_PERIOD * 3).await;
        let after_first = calls.load(Ordering::SeqCst);

        // Manual refresh still works once the loop is gone
        assert_eq!(
            controller.refresh().await,
            RefreshOutcome::Completed { records: 3 }
        );
        assert_eq!(calls.load(Ordering::SeqCst), after_first + 1);

        let handle = controller.start(DEFAULT_PERIOD);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_first + 2);
        tokio::time::sleep(DEFAULT_PERIOD).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_first + 3);
        assert!(!handle.is_stopped());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_stopped_controller_refuses_refresh() {
        let (scanner, calls) = MockScanner::new();
        let controller = PollController::new(scanner, ScanOptions::default());

        controller.stop();
        assert_eq!(controller.refresh().await, RefreshOutcome::Stopped);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_loop() {
        let (scanner, calls) = MockScanner::new();
        let controller = Arc::new(PollController::new(scanner, ScanOptions::default()));

        drop(controller.start(DEFAULT_PERIOD));
        tokio::time::sleep(DEFAULT_PERIOD * 5).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!controller.is_stopped());
    }
}
