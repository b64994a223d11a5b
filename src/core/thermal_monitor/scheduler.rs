//! Sampling scheduler: owns the refresh cadence and publishes snapshots.
//!
//! The scheduler runs on its own small Tokio runtime so it can be driven from
//! plain synchronous code. Three execution contexts are involved:
//!
//! - the sampling task, which ticks on an interval and derives snapshots,
//! - a blocking thread per probe call, bounded by a timeout,
//! - the publisher task, which swaps the current snapshot and notifies
//!   subscribers.
//!
//! Sampling hands finished snapshots to the publisher through a single-slot
//! mailbox, so publication happens in strict tick order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};

use super::jitter::Jitter;
use super::probe::{sanitize_fans, FanReadings, HardwareProbe, RawMetrics};
use super::snapshot::SensorSnapshot;
use super::subscribers::{SubscriberRegistry, SubscriptionHandle};
use super::update;
use crate::error::{MonitorError, ProbeError, Result};

/// Timing of the sampling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between ticks
    pub interval: Duration,
    /// A probe call taking longer than this counts as a failure
    pub probe_timeout: Duration,
}

impl SchedulerConfig {
    /// Config whose probe timeout equals the tick interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            probe_timeout: interval,
        }
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(MonitorError::config("sampling interval must be greater than zero"));
        }
        if self.probe_timeout.is_zero() {
            return Err(MonitorError::config("probe timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

/// Where the scheduler is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Sampling,
    Publishing,
    /// Terminal
    Stopped,
}

/// Counters describing the scheduler's history so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub published: u64,
    pub probe_failures: u64,
    pub invariant_violations: u64,
}

#[derive(Default)]
struct SchedulerStats {
    ticks: AtomicU64,
    published: AtomicU64,
    probe_failures: AtomicU64,
    invariant_violations: AtomicU64,
}

impl SchedulerStats {
    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            probe_failures: self.probe_failures.load(Ordering::Relaxed),
            invariant_violations: self.invariant_violations.load(Ordering::Relaxed),
        }
    }
}

enum Lifecycle {
    NotStarted,
    Running { shutdown_tx: broadcast::Sender<()> },
    Stopped,
}

/// State shared between the handle and the background tasks
struct Shared {
    config: SchedulerConfig,
    probe: Arc<Mutex<Box<dyn HardwareProbe>>>,
    probe_name: String,
    jitter: Mutex<Jitter>,
    snapshot_tx: watch::Sender<Arc<SensorSnapshot>>,
    subscribers: SubscriberRegistry,
    state: Mutex<SchedulerState>,
    stats: SchedulerStats,
}

impl Shared {
    fn set_state(&self, next: SchedulerState) {
        let mut state = self.state.lock();
        if *state != SchedulerState::Stopped {
            *state = next;
        }
    }

    /// Run the probe on a blocking thread under the configured timeout
    async fn sample(&self) -> std::result::Result<(RawMetrics, FanReadings), ProbeError> {
        let probe = self.probe.clone();
        let job = tokio::task::spawn_blocking(
            move || -> std::result::Result<(RawMetrics, FanReadings), ProbeError> {
                // A previous call that timed out may still be holding the probe
                let mut guard = probe
                    .try_lock()
                    .ok_or_else(|| ProbeError::unavailable("previous probe call still running"))?;
                let raw = guard.sample_cpu_and_memory_usage()?.validate()?;
                let fans = sanitize_fans(guard.sample_fan_speeds());
                Ok((raw, fans))
            },
        );

        match tokio::time::timeout(self.config.probe_timeout, job).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ProbeError::unavailable(format!(
                "probe task failed: {}",
                join_error
            ))),
            Err(_) => Err(ProbeError::Timeout(self.config.probe_timeout)),
        }
    }

    /// One sampling cycle. Always yields a snapshot; probe failures degrade
    /// to the last known metrics.
    async fn run_tick(
        &self,
        previous: &SensorSnapshot,
        tracker: &mut ProbeTracker,
    ) -> Arc<SensorSnapshot> {
        self.set_state(SchedulerState::Sampling);
        self.stats.ticks.fetch_add(1, Ordering::Relaxed);

        let (raw, fans) = match self.sample().await {
            Ok((raw, fans)) => {
                tracker.record_success(raw, &self.probe_name);
                (raw, fans)
            }
            Err(e) => {
                self.stats.probe_failures.fetch_add(1, Ordering::Relaxed);
                tracker.record_failure(&e, &self.probe_name);
                (RawMetrics::fallback(tracker.last_good), FanReadings::new())
            }
        };

        let outcome = {
            let mut jitter = self.jitter.lock();
            update::next_snapshot(previous, raw, &fans, &mut jitter)
        };

        for violation in &outcome.violations {
            self.stats
                .invariant_violations
                .fetch_add(1, Ordering::Relaxed);
            log::error!("Snapshot {}: {}", outcome.snapshot.sequence, violation);
        }

        Arc::new(outcome.snapshot)
    }
}

/// Remembers the last good sample and whether the probe is in a failure streak
#[derive(Debug, Default)]
struct ProbeTracker {
    last_good: Option<RawMetrics>,
    failing_since: Option<u64>,
    failures: u64,
}

impl ProbeTracker {
    fn record_success(&mut self, raw: RawMetrics, probe: &str) {
        if let Some(streak) = self.failing_since.take() {
            log::info!(
                "Probe '{}' recovered after {} failed samples",
                probe,
                self.failures - streak
            );
        }
        self.last_good = Some(raw);
    }

    fn record_failure(&mut self, error: &ProbeError, probe: &str) {
        if self.failing_since.is_none() {
            log::warn!("Probe '{}' unavailable, using estimates: {}", probe, error);
            self.failing_since = Some(self.failures);
        } else {
            log::debug!("Probe '{}' still unavailable: {}", probe, error);
        }
        self.failures += 1;
    }
}

/// Periodically samples hardware and publishes immutable snapshots.
///
/// Readers call [`current_snapshot`](Self::current_snapshot) at any time, or
/// register a callback with [`subscribe`](Self::subscribe). Both `start` and
/// `stop` are idempotent; once stopped the scheduler stays stopped.
pub struct SamplingScheduler {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
    runtime: Option<tokio::runtime::Runtime>,
}

impl SamplingScheduler {
    /// Scheduler starting from the seed snapshot with entropy-seeded jitter
    pub fn new<P: HardwareProbe + 'static>(config: SchedulerConfig, probe: P) -> Result<Self> {
        Self::with_parts(
            config,
            Box::new(probe),
            Jitter::from_entropy(),
            SensorSnapshot::seed(),
        )
    }

    pub fn with_parts(
        config: SchedulerConfig,
        probe: Box<dyn HardwareProbe>,
        jitter: Jitter,
        initial: SensorSnapshot,
    ) -> Result<Self> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("sampling-worker")
            .build()?;

        let (snapshot_tx, _) = watch::channel(Arc::new(initial));
        let probe_name = probe.name().to_string();

        let shared = Arc::new(Shared {
            config,
            probe: Arc::new(Mutex::new(probe)),
            probe_name,
            jitter: Mutex::new(jitter),
            snapshot_tx,
            subscribers: SubscriberRegistry::new(),
            state: Mutex::new(SchedulerState::Idle),
            stats: SchedulerStats::default(),
        });

        Ok(Self {
            shared,
            lifecycle: Mutex::new(Lifecycle::NotStarted),
            runtime: Some(runtime),
        })
    }

    /// Begin ticking. The first sample is taken immediately.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock();
        match *lifecycle {
            Lifecycle::Running { .. } => {
                log::debug!("Sampling scheduler already running");
                return;
            }
            Lifecycle::Stopped => {
                log::warn!("Sampling scheduler was stopped; start() ignored");
                return;
            }
            Lifecycle::NotStarted => {}
        }

        let runtime = match self.runtime.as_ref() {
            Some(runtime) => runtime,
            None => return,
        };

        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
        let (mailbox_tx, mailbox_rx) = mpsc::channel::<Arc<SensorSnapshot>>(1);

        runtime.spawn(publisher_task(self.shared.clone(), mailbox_rx));
        runtime.spawn(sampling_task(self.shared.clone(), mailbox_tx, shutdown_rx));

        *lifecycle = Lifecycle::Running { shutdown_tx };
    }

    /// Cancel future ticks. A sample already in flight still publishes once.
    ///
    /// Does not wait for the background tasks, so it is safe to call from a
    /// subscriber callback.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if let Lifecycle::Running { shutdown_tx } = &*lifecycle {
            // No receiver means the sampling task already exited
            let _ = shutdown_tx.send(());
            log::info!("Sampling scheduler stopping");
        }
        *lifecycle = Lifecycle::Stopped;
        *self.shared.state.lock() = SchedulerState::Stopped;
    }

    /// Stop and wait up to `timeout` for background work to wind down
    ///
    /// Must be called from synchronous code, not from inside a subscriber.
    pub fn shutdown(mut self, timeout: Duration) {
        self.stop();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_timeout(timeout);
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lifecycle.lock(), Lifecycle::Running { .. })
    }

    pub fn state(&self) -> SchedulerState {
        *self.shared.state.lock()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn config(&self) -> SchedulerConfig {
        self.shared.config
    }

    /// Latest published snapshot (the initial one until the first tick lands)
    pub fn current_snapshot(&self) -> Arc<SensorSnapshot> {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Watch channel for async consumers
    pub fn snapshot_receiver(&self) -> watch::Receiver<Arc<SensorSnapshot>> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Register a callback fired once per publish, in publish order, on the
    /// publisher task
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&Arc<SensorSnapshot>) + Send + Sync + 'static,
    {
        self.shared.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.shared.subscribers.unsubscribe(handle)
    }
}

impl Drop for SamplingScheduler {
    fn drop(&mut self) {
        self.stop();
        if let Some(runtime) = self.runtime.take() {
            // A hung probe call must not hang the caller
            runtime.shutdown_background();
        }
    }
}

/// Tick loop. Produces snapshots and hands them to the publisher.
async fn sampling_task(
    shared: Arc<Shared>,
    mailbox_tx: mpsc::Sender<Arc<SensorSnapshot>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::info!(
        "Sampling started (probe '{}', every {:?})",
        shared.probe_name,
        shared.config.interval
    );

    let mut previous = shared.snapshot_tx.borrow().clone();
    let mut tracker = ProbeTracker::default();

    let mut ticker = interval(shared.config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                break;
            }
            _ = ticker.tick() => {
                let next = shared.run_tick(&previous, &mut tracker).await;

                shared.set_state(SchedulerState::Publishing);
                if mailbox_tx.send(next.clone()).await.is_err() {
                    log::error!("Publisher task gone, sampling stops");
                    break;
                }
                shared.set_state(SchedulerState::Idle);

                previous = next;
            }
        }
    }

    log::info!(
        "Sampling stopped after {} ticks",
        shared.stats.ticks.load(Ordering::Relaxed)
    );
}

/// Publication path: swap the current snapshot, then notify subscribers.
/// Exits once the sampling task drops its end of the mailbox.
async fn publisher_task(
    shared: Arc<Shared>,
    mut mailbox_rx: mpsc::Receiver<Arc<SensorSnapshot>>,
) {
    while let Some(snapshot) = mailbox_rx.recv().await {
        shared.snapshot_tx.send_replace(snapshot.clone());
        shared.stats.published.fetch_add(1, Ordering::Relaxed);
        log::trace!("Published snapshot {}", snapshot.sequence);

        shared.subscribers.notify(&snapshot);
    }
}
